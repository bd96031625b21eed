use pretty_assertions::assert_eq;

use crate::ast::*;
use crate::parser::parse_sql;

#[test]
fn test_insert() {
    let q = parse_sql("INSERT INTO users (name, email) VALUES ('Ann', 'ann@example.com')");
    assert_eq!(q.query_type, QueryType::Insert);
    assert_eq!(q.main_table, "users");
    assert_eq!(
        q.columns,
        vec![ColumnRef::named("name"), ColumnRef::named("email")]
    );
    assert_eq!(
        q.values,
        Some(vec!["'Ann'".to_string(), "'ann@example.com'".to_string()])
    );
    assert_eq!(q.set, None);
}

#[test]
fn test_values_split_respects_quotes() {
    let q = parse_sql("INSERT INTO t (a,b) VALUES ('x,y', 'z')");
    assert_eq!(q.values, Some(vec!["'x,y'".to_string(), "'z'".to_string()]));
}

#[test]
fn test_values_split_respects_parens() {
    let q = parse_sql("INSERT INTO events (id, at) VALUES (1, NOW())");
    assert_eq!(q.values, Some(vec!["1".to_string(), "NOW()".to_string()]));
}

#[test]
fn test_update() {
    let q = parse_sql("UPDATE users SET name = 'A, B', score = score + 1 WHERE id = 3");
    assert_eq!(q.query_type, QueryType::Update);
    assert_eq!(q.main_table, "users");
    assert_eq!(
        q.set,
        Some(vec![
            Assignment {
                name: "name".to_string(),
                value: "'A, B'".to_string(),
            },
            Assignment {
                name: "score".to_string(),
                value: "score + 1".to_string(),
            },
        ])
    );
    assert_eq!(q.where_clause, "id = 3");
    assert_eq!(q.values, None);
}

#[test]
fn test_delete() {
    let q = parse_sql("DELETE FROM sessions WHERE expired_at < '2024-01-01'");
    assert_eq!(q.query_type, QueryType::Delete);
    assert_eq!(q.main_table, "sessions");
    assert_eq!(q.where_clause, "expired_at < '2024-01-01'");
    assert!(q.columns.is_empty());
}
