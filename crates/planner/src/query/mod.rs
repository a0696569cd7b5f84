//! SQL statement trees, their builder, and dialect-aware rendering.

use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;

/// An unqualified column reference.
pub fn ident(name: &str) -> Expr {
    column(None, name)
}

/// `alias.column`
pub fn qualified(qualifier: &str, name: &str) -> Expr {
    column(Some(qualifier), name)
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}

fn column(qualifier: Option<&str>, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: qualifier.map(str::to_string),
        name: name.to_string(),
    })
}
