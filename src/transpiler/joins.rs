//! Join-kind classification.
//!
//! A join is a *simple association* when its ON condition is
//! `a.id = b.<singular a>_id` (either way round) between the main table and
//! the joined table. Those map onto named ORM relationships; every other join
//! is emitted as raw SQL.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::ast::{JoinClause, ParsedQuery};
use crate::inflect::singularize;
use crate::parser::parse_where_expr;

static SIMPLE_ASSOCIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^`?(\w+)`?\.`?(\w+)`?\s*=\s*`?(\w+)`?\.`?(\w+)`?$")
        .expect("valid association pattern")
});

/// Relationship implied by a conventional foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// The joined table holds the foreign key (`users` has many `posts`).
    HasMany(String),
    /// The main table holds the foreign key (`posts` belongs to `user`).
    BelongsTo(String),
}

impl Association {
    /// Relationship name as the ORM spells it.
    pub fn name(&self) -> &str {
        match self {
            Association::HasMany(name) | Association::BelongsTo(name) => name,
        }
    }
}

/// Resolve an alias to its table name within this statement.
fn resolve<'a>(name: &'a str, query: &'a ParsedQuery) -> &'a str {
    if query.is_main_reference(name) {
        return &query.main_table;
    }
    query.join_for(name).map_or(name, |j| j.table.as_str())
}

fn is_foreign_key(column: &str, key_table: &str) -> bool {
    column.eq_ignore_ascii_case(&format!("{}_id", singularize(key_table)))
}

/// Classify `join` by its whole ON condition; `None` means raw SQL.
pub fn classify(join: &JoinClause, query: &ParsedQuery) -> Option<Association> {
    let association = key_association(&join.on, join, query);
    debug!(table = %join.table, ?association, "classified join");
    association
}

/// Like [`classify`], but the key equality may be any top-level `AND`
/// operand of the ON condition.
pub fn find_association(join: &JoinClause, query: &ParsedQuery) -> Option<Association> {
    let tree = parse_where_expr(&join.on)?;
    if tree.has_or() {
        return None;
    }
    tree.conjuncts()
        .into_iter()
        .find_map(|c| key_association(&c.to_string(), join, query))
}

/// `condition` is the foreign-key equality linking `join` to the main table.
pub fn is_key_condition(condition: &str, join: &JoinClause, query: &ParsedQuery) -> bool {
    key_association(condition, join, query).is_some()
}

fn key_association(condition: &str, join: &JoinClause, query: &ParsedQuery) -> Option<Association> {
    let caps = SIMPLE_ASSOCIATION.captures(condition.trim())?;
    let left = (resolve(&caps[1], query), &caps[2]);
    let right = (resolve(&caps[3], query), &caps[4]);

    let main = query.main_table.as_str();
    let joined = join.table.as_str();
    let connects = |a: &str, b: &str| a.eq_ignore_ascii_case(main) && b.eq_ignore_ascii_case(joined);

    for ((id_table, id_col), (fk_table, fk_col)) in [(left, right), (right, left)] {
        if !id_col.eq_ignore_ascii_case("id") || !is_foreign_key(fk_col, id_table) {
            continue;
        }
        if connects(id_table, fk_table) {
            return Some(Association::HasMany(joined.to_string()));
        }
        if connects(fk_table, id_table) {
            return Some(Association::BelongsTo(singularize(joined)));
        }
    }
    None
}

pub fn is_simple_association(join: &JoinClause, query: &ParsedQuery) -> bool {
    classify(join, query).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sql;

    #[test]
    fn test_has_many() {
        let q = parse_sql("SELECT * FROM users INNER JOIN posts ON users.id = posts.user_id");
        assert_eq!(
            classify(&q.joins[0], &q),
            Some(Association::HasMany("posts".to_string()))
        );
    }

    #[test]
    fn test_belongs_to_reversed_sides() {
        let q = parse_sql("SELECT * FROM posts JOIN users ON users.id = posts.user_id");
        assert_eq!(
            classify(&q.joins[0], &q),
            Some(Association::BelongsTo("user".to_string()))
        );
    }

    #[test]
    fn test_aliases_resolve() {
        let q = parse_sql("SELECT * FROM users u JOIN posts p ON p.user_id = u.id");
        assert!(is_simple_association(&q.joins[0], &q));
    }

    #[test]
    fn test_non_conventional_join() {
        let q = parse_sql("SELECT * FROM users JOIN posts ON users.name = posts.title");
        assert!(!is_simple_association(&q.joins[0], &q));
        let q = parse_sql(
            "SELECT * FROM users JOIN posts ON users.id = posts.user_id AND posts.published = true",
        );
        assert!(!is_simple_association(&q.joins[0], &q));
    }

    #[test]
    fn test_association_among_filters() {
        let q = parse_sql(
            "SELECT * FROM users JOIN posts ON users.id = posts.user_id AND posts.published = true",
        );
        assert_eq!(
            find_association(&q.joins[0], &q),
            Some(Association::HasMany("posts".to_string()))
        );
        let q = parse_sql(
            "SELECT * FROM users JOIN posts ON users.id = posts.user_id OR posts.pinned = true",
        );
        assert_eq!(find_association(&q.joins[0], &q), None);
    }
}
