//! Compiles a filter tree into the account key query.

use crate::{
    catalog::SchemaCatalog,
    filter::{
        error::FilterError,
        resolve::{JoinRequirement, Resolver},
        tree::{FilterNode, GroupKind, Predicate},
    },
    query::{
        ast::{
            common::JoinKind,
            expr::{BinaryOperator, Expr},
            select::Select,
        },
        builder::select::SelectBuilder,
        dialect::{Dialect, Postgres},
        qualified,
        renderer::{render_inline, render_parameterized},
    },
    schema::{AccountSchema, JoinKeys, TableSpec},
};
use model::core::value::Value;
use tracing::{debug, info};

pub struct FilterCompiler<'a> {
    catalog: &'a dyn SchemaCatalog,
    schema: &'a AccountSchema,
}

/// The assembled statement. Rendering is deferred so the same compile can
/// produce both the display text and the executable form.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub select: Select,
    pub joins: JoinRequirement,
}

impl CompiledQuery {
    /// Statement text with values inlined as SQL literals.
    pub fn sql(&self, dialect: &dyn Dialect) -> String {
        render_inline(&self.select, dialect)
    }

    /// Statement with placeholders, plus the values bound to them.
    pub fn parameterized(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        render_parameterized(&self.select, dialect)
    }

    /// md5 hex digest of the statement text.
    pub fn fingerprint(&self, dialect: &dyn Dialect) -> String {
        format!("{:x}", md5::compute(self.sql(dialect)))
    }
}

impl<'a> FilterCompiler<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog, schema: &'a AccountSchema) -> Self {
        Self { catalog, schema }
    }

    pub fn schema(&self) -> &AccountSchema {
        self.schema
    }

    pub fn compile_json(&self, filter: &serde_json::Value) -> Result<CompiledQuery, FilterError> {
        self.compile(&FilterNode::from_json(filter)?)
    }

    pub fn compile(&self, filter: &FilterNode) -> Result<CompiledQuery, FilterError> {
        let mut resolver = Resolver::new(self.catalog, self.schema);
        let condition = self.compile_node(filter, &mut resolver)?;
        let joins = resolver.joins();
        debug!("Join requirement for filter: {:?}", joins);

        let anchor = &self.schema.anchor;
        let mut builder = SelectBuilder::new()
            .select(vec![qualified(&anchor.alias, &self.schema.anchor_key)])
            .from(anchor.table_ref(), Some(&anchor.alias));

        if joins.contains(JoinRequirement::APPLICANT) {
            builder = builder.join(
                JoinKind::Inner,
                self.schema.applicant.table_ref(),
                Some(&self.schema.applicant.alias),
                self.join_condition(&self.schema.applicant, &self.schema.applicant_join),
            );
        }
        if joins.contains(JoinRequirement::DIMENSION) {
            builder = builder.join(
                JoinKind::Left,
                self.schema.dimension.table_ref(),
                Some(&self.schema.dimension.alias),
                self.join_condition(&self.schema.dimension, &self.schema.dimension_join),
            );
        }
        if let Some(condition) = condition {
            builder = builder.where_clause(condition);
        }

        let compiled = CompiledQuery {
            select: builder.build(),
            joins,
        };
        info!(
            "Compiled account filter ({} predicates), fingerprint {}",
            filter.predicate_count(),
            compiled.fingerprint(&Postgres)
        );
        Ok(compiled)
    }

    fn join_condition(&self, joined: &TableSpec, keys: &JoinKeys) -> Expr {
        Expr::binary(
            qualified(&self.schema.anchor.alias, &keys.anchor_column),
            BinaryOperator::Eq,
            qualified(&joined.alias, &keys.joined_column),
        )
    }

    /// `None` for a group that holds no predicates.
    fn compile_node(
        &self,
        node: &FilterNode,
        resolver: &mut Resolver<'a>,
    ) -> Result<Option<Expr>, FilterError> {
        match node {
            FilterNode::Predicate(predicate) => self.compile_predicate(predicate, resolver).map(Some),
            FilterNode::Group { kind, children } => {
                let op = match kind {
                    GroupKind::And => BinaryOperator::And,
                    GroupKind::Or => BinaryOperator::Or,
                };
                let mut exprs = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(expr) = self.compile_node(child, resolver)? {
                        exprs.push(expr);
                    }
                }
                Ok(Expr::fold(exprs, op))
            }
        }
    }

    fn compile_predicate(
        &self,
        predicate: &Predicate,
        resolver: &mut Resolver<'a>,
    ) -> Result<Expr, FilterError> {
        let column = resolver.resolve(&predicate.field)?;
        predicate.operator.build(
            &predicate.field.to_string(),
            column.to_expr(),
            &predicate.operand,
            &self.schema.country_function,
        )
    }
}
