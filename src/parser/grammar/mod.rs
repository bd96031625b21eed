//! nom grammar for WHERE-style boolean expressions.

pub mod base;
pub mod conditions;

pub use conditions::parse_where_expr;
