//! Turns statement trees into SQL text for a [`Dialect`].
//!
//! Two modes share one walk over the tree: parameterized rendering emits
//! placeholders and collects the values in order, inline rendering writes
//! each value as an escaped literal.

use model::core::value::Value;

use crate::query::{ast::common::TableRef, dialect::Dialect};

pub mod expr;
pub mod select;

pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Output buffer plus the collected parameters for one statement.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
    inline: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            inline: false,
        }
    }

    pub fn inline(dialect: &'a dyn Dialect) -> Self {
        Self {
            inline: true,
            ..Self::new(dialect)
        }
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Writes a placeholder and records `value`, or writes the literal in
    /// inline mode.
    pub fn add_param(&mut self, value: Value) {
        if self.inline {
            self.sql.push_str(&value.to_string());
        } else {
            let placeholder = self.dialect.placeholder(self.params.len());
            self.params.push(value);
            self.sql.push_str(&placeholder);
        }
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.sql.push_str(&self.dialect.quote_identifier(schema));
            self.sql.push('.');
        }
        self.sql.push_str(&self.dialect.quote_identifier(&table.name));
    }

    /// ` AS "alias"` when an alias is set.
    pub fn render_alias(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias {
            self.sql.push_str(" AS ");
            self.sql.push_str(&self.dialect.quote_identifier(alias));
        }
    }
}

pub fn render_parameterized(node: &dyn Render, dialect: &dyn Dialect) -> (String, Vec<Value>) {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.finish()
}

pub fn render_inline(node: &dyn Render, dialect: &dyn Dialect) -> String {
    let mut renderer = Renderer::inline(dialect);
    node.render(&mut renderer);
    renderer.finish().0
}
