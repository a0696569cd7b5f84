pub mod compile;
pub mod error;
pub mod operator;
pub mod resolve;
pub mod tree;

pub use compile::{CompiledQuery, FilterCompiler};
pub use error::FilterError;
pub use operator::OperatorKind;
pub use tree::{FieldRef, FilterNode, GroupKind, Operand, Predicate};
