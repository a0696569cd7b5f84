//! Plans the per-table queries that gather account properties.

pub mod error;
pub mod layout;
pub mod planner;

pub use error::PropertyError;
pub use layout::{Bridge, ComputedColumn, PropertyLayout, PropertySource};
pub use planner::{PropertyPlan, PropertyPlanner, SourcePlan};
