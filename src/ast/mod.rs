//! Structured representation of a parsed SQL statement.

pub mod conditions;
pub mod query;
pub mod values;

pub use conditions::*;
pub use query::*;
pub use values::*;
