//! Code generation from [`ParsedQuery`] to ORM call chains.
//!
//! Each target has a no-join generator and a join generator; the no-join
//! generator hands statements with joins to its sibling. WHERE handling is
//! shared through [`traits::render_where`].

pub mod aggregate;
pub mod joins;
pub mod orm;
pub mod target;
pub mod traits;

#[cfg(test)]
mod tests;

pub use orm::{
    ActiveRecordGenerator, ActiveRecordJoinGenerator, SequelizeGenerator, SequelizeJoinGenerator,
};
pub use target::Target;
pub use traits::{WhereDialect, WherePlan, render_where};

use crate::ast::{ParsedQuery, QueryType, UNKNOWN_TABLE};
use crate::parser::parse_sql;

/// One ORM code generator.
pub trait OrmGenerator {
    /// Output language, used for literals and comments.
    fn target(&self) -> Target;

    fn generate_select(&self, query: &ParsedQuery) -> String;

    fn generate_insert(&self, query: &ParsedQuery) -> String;

    fn generate_update(&self, query: &ParsedQuery) -> String;

    fn generate_delete(&self, query: &ParsedQuery) -> String;

    /// Dispatch on the statement type.
    fn generate_query(&self, query: &ParsedQuery) -> String {
        dispatch(self, query)
    }
}

/// Statement-type dispatch shared by every generator.
pub fn dispatch<G: OrmGenerator + ?Sized>(generator: &G, query: &ParsedQuery) -> String {
    match query.query_type {
        QueryType::Select => generator.generate_select(query),
        QueryType::Insert => generator.generate_insert(query),
        QueryType::Update => generator.generate_update(query),
        QueryType::Delete => generator.generate_delete(query),
        QueryType::Unknown if query.main_table == UNKNOWN_TABLE => {
            generator.target().comment("Could not parse this SQL query")
        }
        QueryType::Unknown => generator.target().comment("Query type not supported"),
    }
}

/// Parse `sql` and generate code for `target`.
///
/// ```
/// use sql2orm::transpiler::{Target, convert};
///
/// assert_eq!(convert("SELECT * FROM teams", Target::ActiveRecord), "Team");
/// assert_eq!(
///     convert("SELECT * FROM users WHERE age = 25", Target::Sequelize),
///     "User.findAll({where: { age: 25 }})"
/// );
/// ```
pub fn convert(sql: &str, target: Target) -> String {
    let parsed = parse_sql(sql);
    tracing::debug!(query_type = %parsed.query_type, table = %parsed.main_table, "parsed statement");
    target.generator().generate_query(&parsed)
}
