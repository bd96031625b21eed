//! WHERE classification into condition categories.
//!
//! All entry points work on the expression tree from
//! [`parse_where_expr`](crate::parser::parse_where_expr). Category order is
//! structural: a [`ConditionSet`] keeps LIKE, IN, BETWEEN, NULL and simple
//! comparisons in separate buckets, each in source order.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::ast::*;
use crate::parser::parse_where_expr;
use crate::parser::scan::mask_quotes;
use crate::values::parse_value;

static SUBQUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\([^)]*\bselect\b").expect("valid subquery pattern"));

/// A parenthesized group containing `SELECT` appears outside quoted text.
pub fn has_subquery(expr: &str) -> bool {
    SUBQUERY.is_match(&mask_quotes(expr))
}

/// No `OR`, no subquery, and every `AND` operand is a comparison.
pub fn is_simple_equality(expr: &str) -> bool {
    if has_subquery(expr) {
        return false;
    }
    let Some(tree) = parse_where_expr(expr) else {
        return false;
    };
    !tree.has_or()
        && tree
            .conjuncts()
            .iter()
            .all(|c| matches!(c, WhereExpr::Leaf(Predicate::Comparison { .. })))
}

/// Comparisons among the top-level `AND` operands. Anything else is dropped
/// with a warning.
pub fn parse_simple_conditions(where_clause: &str) -> Vec<SimpleCondition> {
    if has_subquery(where_clause) {
        return Vec::new();
    }
    let Some(tree) = parse_where_expr(where_clause) else {
        return Vec::new();
    };
    let mut conditions = Vec::new();
    for conjunct in tree.conjuncts() {
        match conjunct {
            WhereExpr::Leaf(Predicate::Comparison { field, op, value }) => {
                conditions.push(simple(field, *op, value));
            }
            other => warn!(fragment = %other, "dropping non-comparison condition"),
        }
    }
    conditions
}

/// Bucket every leaf of the WHERE tree by category. `IN (SELECT ...)` leaves
/// are skipped (see [`extract_subqueries`]); unclassifiable fragments are
/// collected in [`ConditionSet::unparsed`].
pub fn parse_complex_conditions(where_clause: &str) -> ConditionSet {
    let mut set = ConditionSet::default();
    let Some(tree) = parse_where_expr(where_clause) else {
        return set;
    };
    if tree.has_or() {
        debug!("OR structure is not kept by condition buckets");
    }
    collect(&tree, &mut set);
    for fragment in &set.unparsed {
        warn!(fragment = %fragment, "condition fragment not understood");
    }
    set
}

fn collect(expr: &WhereExpr, set: &mut ConditionSet) {
    match expr {
        WhereExpr::And(children) | WhereExpr::Or(children) => {
            for child in children {
                collect(child, set);
            }
        }
        WhereExpr::Not(inner) => match inner.as_ref() {
            WhereExpr::Leaf(p) => match p.negated() {
                Some(negated) => bucket(&negated, set),
                None => set.unparsed.push(expr.to_string()),
            },
            _ => set.unparsed.push(expr.to_string()),
        },
        WhereExpr::Leaf(p) => bucket(p, set),
    }
}

fn bucket(predicate: &Predicate, set: &mut ConditionSet) {
    match predicate {
        Predicate::Comparison { field, op, value } => set.simple.push(simple(field, *op, value)),
        Predicate::Like {
            field,
            not,
            pattern,
            case_insensitive,
        } => set.like.push(LikeCondition {
            field: field.clone(),
            not: *not,
            pattern: pattern.clone(),
            case_insensitive: *case_insensitive,
        }),
        Predicate::In { field, not, values } => set.in_list.push(InCondition {
            field: field.clone(),
            not: *not,
            values: values.iter().map(|v| parse_value(v)).collect(),
        }),
        Predicate::Between {
            field,
            not,
            start,
            end,
        } => set.between.push(BetweenCondition {
            field: field.clone(),
            not: *not,
            start: parse_value(start),
            end: parse_value(end),
        }),
        Predicate::IsNull { field, not } => set.null.push(NullCheck {
            field: field.clone(),
            not: *not,
        }),
        Predicate::InSubquery { .. } => {}
        Predicate::Raw { text } => set.unparsed.push(text.clone()),
    }
}

fn simple(field: &str, op: ComparisonOp, value: &str) -> SimpleCondition {
    SimpleCondition {
        field: field.to_string(),
        operator: op,
        value: parse_value(value),
    }
}

/// Every `field [NOT] IN (SELECT ...)` predicate.
pub fn extract_subqueries(where_clause: &str) -> Vec<SubqueryCondition> {
    let Some(tree) = parse_where_expr(where_clause) else {
        return Vec::new();
    };
    tree.leaves()
        .into_iter()
        .filter_map(|p| match p {
            Predicate::InSubquery {
                field,
                not,
                subquery,
            } => Some(SubqueryCondition {
                field: field.clone(),
                not: *not,
                subquery: subquery.clone(),
                full_match: p.to_string(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_has_subquery() {
        assert!(has_subquery("id IN (SELECT user_id FROM posts)"));
        assert!(has_subquery("age > (select avg(age) from users)"));
        assert!(!has_subquery(r#"posts.title LIKE "SELECT%""#));
        assert!(!has_subquery("id IN (selected_ids)"));
        assert!(!has_subquery("name = '(SELECT 1)'"));
    }

    #[test]
    fn test_is_simple_equality() {
        assert!(is_simple_equality("age = 25 AND status = 'active'"));
        assert!(is_simple_equality("age >= 21"));
        assert!(is_simple_equality("color = 'red' AND order_id = 3"));
        assert!(!is_simple_equality("age = 25 OR status = 'active'"));
        assert!(!is_simple_equality("age = 25 AND invalid"));
        assert!(!is_simple_equality("name LIKE '%John%' AND age = 25"));
        assert!(!is_simple_equality("id IN (SELECT id FROM t)"));
        assert!(!is_simple_equality(""));
    }

    #[test]
    fn test_parse_simple_conditions_drops_malformed() {
        let conditions = parse_simple_conditions("age = 25 AND invalid AND status = 'active'");
        assert_eq!(
            conditions,
            vec![
                SimpleCondition {
                    field: "age".to_string(),
                    operator: ComparisonOp::Eq,
                    value: TypedValue::Integer(25),
                },
                SimpleCondition {
                    field: "status".to_string(),
                    operator: ComparisonOp::Eq,
                    value: TypedValue::String("active".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_simple_conditions_with_subquery_is_empty() {
        assert!(parse_simple_conditions("id IN (SELECT id FROM t) AND a = 1").is_empty());
    }

    #[test]
    fn test_complex_category_order() {
        let set = parse_complex_conditions(
            "status = 'active' AND age BETWEEN 18 AND 30 AND name LIKE '%John%'",
        );
        assert_eq!(
            set.like,
            vec![LikeCondition {
                field: "name".to_string(),
                not: false,
                pattern: "%John%".to_string(),
                case_insensitive: false,
            }]
        );
        assert_eq!(
            set.between,
            vec![BetweenCondition {
                field: "age".to_string(),
                not: false,
                start: TypedValue::Integer(18),
                end: TypedValue::Integer(30),
            }]
        );
        assert_eq!(set.simple.len(), 1);
        assert_eq!(set.simple[0].field, "status");
        assert!(set.unparsed.is_empty());
    }

    #[test]
    fn test_complex_in_null_and_negation() {
        let set = parse_complex_conditions(
            "role NOT IN ('admin', 'owner') AND deleted_at IS NULL AND NOT email ILIKE '%@test%'",
        );
        assert_eq!(set.in_list.len(), 1);
        assert!(set.in_list[0].not);
        assert_eq!(
            set.in_list[0].values,
            vec![
                TypedValue::String("admin".to_string()),
                TypedValue::String("owner".to_string())
            ]
        );
        assert_eq!(
            set.null,
            vec![NullCheck {
                field: "deleted_at".to_string(),
                not: false
            }]
        );
        assert!(set.like[0].not);
        assert!(set.like[0].case_insensitive);
    }

    #[test]
    fn test_complex_records_unparsed() {
        let set = parse_complex_conditions("name LIKE 'a%' AND EXISTS (SELECT 1 FROM t)");
        assert_eq!(set.like.len(), 1);
        assert_eq!(set.unparsed, vec!["EXISTS (SELECT 1 FROM t)".to_string()]);
    }

    #[test]
    fn test_complex_skips_subquery_in() {
        let set = parse_complex_conditions("id IN (SELECT user_id FROM posts) AND age > 3");
        assert!(set.in_list.is_empty());
        assert_eq!(set.simple.len(), 1);
    }

    #[test]
    fn test_extract_subqueries() {
        let subs = extract_subqueries("id NOT IN (SELECT user_id FROM bans) AND active = true");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].field, "id");
        assert!(subs[0].not);
        assert_eq!(subs[0].subquery, "SELECT user_id FROM bans");
        assert_eq!(subs[0].full_match, "id NOT IN (SELECT user_id FROM bans)");
    }
}
