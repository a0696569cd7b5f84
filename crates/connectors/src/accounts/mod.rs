//! Compile-and-execute front ends over a [`SqlAdapter`](crate::sql::base::adapter::SqlAdapter).

pub mod error;
pub mod finder;
pub mod properties;

pub use error::AccountsError;
pub use finder::AccountFinder;
pub use properties::fetch_properties;
