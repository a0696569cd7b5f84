//! Quoting and placeholder rules of the databases the account tables live
//! in.

use std::str::FromStr;

pub trait Dialect: Send + Sync {
    /// Quotes a table, alias or column name, doubling embedded quote
    /// characters.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Placeholder for the parameter at zero-based `index`.
    fn placeholder(&self, index: usize) -> String;
}

/// `"name"` identifiers, `$1`-style numbered placeholders.
#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        quote_with(ident, '"')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }
}

/// `` `name` `` identifiers, positional `?` placeholders.
#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        quote_with(ident, '`')
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

fn quote_with(ident: &str, quote: char) -> String {
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push(quote);
    for c in ident.chars() {
        if c == quote {
            quoted.push(quote);
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

/// Names a dialect without holding a connection, e.g. for `--dialect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Postgres,
    MySql,
}

impl DialectKind {
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &Postgres,
            DialectKind::MySql => &MySql,
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pg" | "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            other => Err(format!("Unknown dialect: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(Postgres.quote_identifier("acct_id"), r#""acct_id""#);
        assert_eq!(Postgres.quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(MySql.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.placeholder(0), "$1");
        assert_eq!(Postgres.placeholder(9), "$10");
        assert_eq!(MySql.placeholder(3), "?");
    }

    #[test]
    fn test_dialect_kind_from_str() {
        assert_eq!("PG".parse::<DialectKind>(), Ok(DialectKind::Postgres));
        assert_eq!("mariadb".parse::<DialectKind>(), Ok(DialectKind::MySql));
        assert!("oracle".parse::<DialectKind>().is_err());
    }
}
