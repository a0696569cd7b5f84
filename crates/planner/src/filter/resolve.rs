//! Resolves field references to `(table, column)` pairs.

use crate::{
    catalog::SchemaCatalog,
    filter::{error::FilterError, tree::FieldRef},
    query::{ast::expr::Expr, qualified},
    schema::{AccountSchema, TableRole},
};
use bitflags::bitflags;
use std::collections::BTreeSet;
use tracing::debug;

bitflags! {
    /// Secondary tables referenced by a filter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct JoinRequirement: u8 {
        const APPLICANT = 0b01;
        const DIMENSION = 0b10;
    }
}

impl JoinRequirement {
    pub fn for_role(role: TableRole) -> Self {
        match role {
            TableRole::Anchor => JoinRequirement::empty(),
            TableRole::Applicant => JoinRequirement::APPLICANT,
            TableRole::Dimension => JoinRequirement::DIMENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub role: TableRole,
    /// Alias the column is qualified with in the compiled statement.
    pub qualifier: String,
    pub column: String,
}

impl ResolvedColumn {
    pub fn to_expr(&self) -> Expr {
        qualified(&self.qualifier, &self.column)
    }
}

/// Resolves fields for a single compile and records the joins they need.
pub struct Resolver<'a> {
    schema: &'a AccountSchema,
    catalog: &'a dyn SchemaCatalog,
    snapshot: Option<Vec<(TableRole, &'a BTreeSet<String>)>>,
    joins: JoinRequirement,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog, schema: &'a AccountSchema) -> Self {
        Self {
            schema,
            catalog,
            snapshot: None,
            joins: JoinRequirement::empty(),
        }
    }

    pub fn joins(&self) -> JoinRequirement {
        self.joins
    }

    pub fn resolve(&mut self, field: &FieldRef) -> Result<ResolvedColumn, FilterError> {
        let (role, column) = match field {
            FieldRef::Qualified { table, column } => {
                let role =
                    self.schema
                        .role_of(table)
                        .ok_or_else(|| FilterError::UnknownTable {
                            field: field.to_string(),
                            table: table.clone(),
                        })?;
                (role, column.clone())
            }
            FieldRef::Bare(column) => (self.locate(column)?, column.clone()),
        };

        self.joins |= JoinRequirement::for_role(role);
        let resolved = ResolvedColumn {
            role,
            qualifier: self.schema.table(role).alias.clone(),
            column,
        };
        debug!(
            "Resolved field `{}` to {}.{} ({})",
            field, self.schema.table(role).name, resolved.column, role
        );
        Ok(resolved)
    }

    /// Finds the single known table holding `column`.
    fn locate(&mut self, column: &str) -> Result<TableRole, FilterError> {
        let schema = self.schema;
        let matches = self
            .snapshot()?
            .iter()
            .filter(|(_, columns)| columns.contains(column))
            .map(|(role, _)| *role)
            .collect::<Vec<_>>();

        match matches.as_slice() {
            [role] => Ok(*role),
            [] => Err(FilterError::UnknownColumn {
                column: column.to_string(),
            }),
            roles => Err(FilterError::AmbiguousColumn {
                column: column.to_string(),
                tables: roles
                    .iter()
                    .map(|role| schema.table(*role).name.clone())
                    .collect(),
            }),
        }
    }

    /// Catalog entries of the three known tables, read once per compile.
    fn snapshot(&mut self) -> Result<&[(TableRole, &'a BTreeSet<String>)], FilterError> {
        if self.snapshot.is_none() {
            let catalog = self.catalog;
            let schema = self.schema;
            let tables = schema
                .tables()
                .map(|(role, spec)| {
                    catalog
                        .columns_of(&spec.name)
                        .map(|columns| (role, columns))
                        .ok_or_else(|| FilterError::CatalogMissing {
                            table: spec.name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.snapshot = Some(tables);
        }
        Ok(self.snapshot.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_table("customeraccount_rtab", ["acct_id", "phylum_code", "clearing_status"])
            .with_table("applicant_rtab", ["id", "type", "acct_id"])
            .with_table("rep_dim_acct", ["acct_id", "day_begun", "acct_region"])
    }

    #[test]
    fn test_bare_field_resolves_to_single_table() {
        let catalog = catalog();
        let schema = AccountSchema::default();
        let mut resolver = Resolver::new(&catalog, &schema);

        let resolved = resolver.resolve(&FieldRef::parse("day_begun")).unwrap();
        assert_eq!(resolved.role, TableRole::Dimension);
        assert_eq!(resolved.qualifier, "rda");
        assert_eq!(resolver.joins(), JoinRequirement::DIMENSION);
    }

    #[test]
    fn test_ambiguous_and_unknown_columns() {
        let catalog = catalog();
        let schema = AccountSchema::default();
        let mut resolver = Resolver::new(&catalog, &schema);

        assert_eq!(
            resolver.resolve(&FieldRef::parse("acct_id")).unwrap_err(),
            FilterError::AmbiguousColumn {
                column: "acct_id".into(),
                tables: vec![
                    "customeraccount_rtab".into(),
                    "applicant_rtab".into(),
                    "rep_dim_acct".into()
                ],
            }
        );
        assert_eq!(
            resolver.resolve(&FieldRef::parse("unknown_field")).unwrap_err(),
            FilterError::UnknownColumn {
                column: "unknown_field".into()
            }
        );
        assert!(resolver.joins().is_empty());
    }

    #[test]
    fn test_qualified_column_is_not_checked_against_catalog() {
        let catalog = catalog();
        let schema = AccountSchema::default();
        let mut resolver = Resolver::new(&catalog, &schema);

        let resolved = resolver
            .resolve(&FieldRef::parse("applicant_rtab.not_a_column"))
            .unwrap();
        assert_eq!(resolved.role, TableRole::Applicant);
        assert_eq!(resolved.column, "not_a_column");

        // the alias works as a qualifier too
        let by_alias = resolver.resolve(&FieldRef::parse("ap.type")).unwrap();
        assert_eq!(by_alias.qualifier, "ap");
    }

    #[test]
    fn test_qualified_unknown_table() {
        let catalog = catalog();
        let schema = AccountSchema::default();
        let mut resolver = Resolver::new(&catalog, &schema);

        assert_eq!(
            resolver.resolve(&FieldRef::parse("ibuser_rtab.login")).unwrap_err(),
            FilterError::UnknownTable {
                field: "ibuser_rtab.login".into(),
                table: "ibuser_rtab".into()
            }
        );
    }

    #[test]
    fn test_missing_catalog_table_only_matters_for_bare_fields() {
        let catalog = StaticCatalog::new().with_table("customeraccount_rtab", ["acct_id"]);
        let schema = AccountSchema::default();
        let mut resolver = Resolver::new(&catalog, &schema);

        assert!(resolver.resolve(&FieldRef::parse("rep_dim_acct.day_begun")).is_ok());
        assert_eq!(
            resolver.resolve(&FieldRef::parse("title")).unwrap_err(),
            FilterError::CatalogMissing {
                table: "applicant_rtab".into()
            }
        );
    }
}
