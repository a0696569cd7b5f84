pub mod adapter;
pub mod catalog;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod row;
