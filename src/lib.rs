//! # sql2orm
//!
//! Translate SQL statements into ORM query code.
//!
//! `sql2orm` reads a single `SELECT`, `INSERT`, `UPDATE` or `DELETE` and
//! writes the equivalent ActiveRecord (Ruby) or Sequelize (JavaScript) call
//! chain. Conversion is best-effort: it never fails, and anything it cannot
//! express is emitted as raw SQL or a comment.
//!
//! ## Quick Example
//!
//! ```
//! use sql2orm::prelude::*;
//!
//! let code = convert("SELECT COUNT(*) FROM users WHERE age > 18", Target::ActiveRecord);
//! assert_eq!(code, r#"User.where("age > ?", 18).count"#);
//!
//! let code = convert("SELECT * FROM users WHERE age > 18", Target::Sequelize);
//! assert_eq!(code, "User.findAll({where: { age: { [Op.gt]: 18 } }})");
//! ```
//!
//! ## Pipeline
//!
//! | Stage        | Module         | Output                  |
//! |--------------|----------------|-------------------------|
//! | Parse        | [`parser`]     | [`ast::ParsedQuery`]    |
//! | Classify     | [`conditions`] | [`ast::ConditionSet`]   |
//! | Generate     | [`transpiler`] | ORM source text         |

pub mod ast;
pub mod conditions;
pub mod config;
pub mod error;
pub mod inflect;
pub mod parser;
pub mod transpiler;
pub mod values;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::error::*;
    pub use crate::parser::{parse_sql, parse_sql_strict};
    pub use crate::transpiler::{OrmGenerator, Target, convert};
}

pub use parser::parse_sql;
pub use transpiler::{Target, convert};

use transpiler::OrmGenerator;

/// Convert `sql` for every target, in [`Target::ALL`] order.
///
/// ```
/// let all = sql2orm::convert_all("SELECT * FROM teams");
/// assert_eq!(all[0].1, "Team");
/// assert_eq!(all[1].1, "Team.findAll({})");
/// ```
pub fn convert_all(sql: &str) -> Vec<(Target, String)> {
    let parsed = parse_sql(sql);
    Target::ALL
        .iter()
        .map(|t| (*t, t.generator().generate_query(&parsed)))
        .collect()
}
