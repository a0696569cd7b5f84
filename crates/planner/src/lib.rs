pub mod catalog;
pub mod filter;
pub mod properties;
pub mod query;
pub mod schema;
