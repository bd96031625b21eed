//! SQL statement parser.
//!
//! Each clause is extracted independently from a masked copy of the input
//! (see [`scan`]), then WHERE text is parsed on demand by [`grammar`].
//!
//! ```text
//! SELECT u.name, COUNT(*) FROM users u LEFT JOIN posts p ON ... WHERE ... GROUP BY ... LIMIT 10
//! ──┬─── ───────┬───────      ───┬───  ──────────┬─────────    ───┬───  ─────┬────  ───┬────
//!   │           │                │               │                │          │         └ limit
//!   │           │                │               │                │          └ group_by / having / order_by
//!   │           │                │               │                └ where (raw text)
//!   │           │                │               └ joins
//!   │           │                └ tables[0] / main_table
//!   │           └ columns
//!   └ query_type
//! ```

pub mod clauses;
pub mod grammar;
pub mod scan;

#[cfg(test)]
mod tests;

pub use grammar::parse_where_expr;

use crate::ast::*;
use crate::error::{ConvertError, ConvertResult};

/// Parse a SQL statement. Never fails: a statement without a recognizable
/// keyword or table comes back as [`QueryType::Unknown`] with
/// `main_table == "table"`.
pub fn parse_sql(sql: &str) -> ParsedQuery {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    let masked = scan::mask_nested(sql);

    let Some(table) = clauses::main_table(&masked) else {
        tracing::debug!(sql, "no table found; statement is unparsable");
        return ParsedQuery::unknown();
    };

    let query_type = clauses::statement_type(sql);
    let (columns, distinct) = match query_type {
        QueryType::Select => clauses::select_columns(sql, &masked),
        QueryType::Insert => (clauses::insert_columns(sql, &masked), false),
        _ => (Vec::new(), false),
    };

    ParsedQuery {
        query_type,
        main_table: table.name.clone(),
        tables: vec![table],
        distinct,
        columns,
        joins: clauses::joins(sql, &masked),
        where_clause: clauses::where_clause(sql, &masked),
        values: match query_type {
            QueryType::Insert => clauses::values(sql, &masked),
            _ => None,
        },
        set: match query_type {
            QueryType::Update => clauses::set_clause(sql, &masked),
            _ => None,
        },
        group_by: clauses::group_by(sql, &masked),
        having: clauses::having(sql, &masked),
        order_by: clauses::order_by(sql, &masked),
        limit: clauses::limit(&masked),
    }
}

/// Like [`parse_sql`], but an unparsable statement is an error.
pub fn parse_sql_strict(sql: &str) -> ConvertResult<ParsedQuery> {
    let parsed = parse_sql(sql);
    if parsed.query_type == QueryType::Unknown {
        return Err(ConvertError::unparsable(sql));
    }
    Ok(parsed)
}
