//! Shared WHERE dispatch and identifier helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::ast::*;
use crate::conditions::{
    has_subquery, is_simple_equality, parse_complex_conditions, parse_simple_conditions,
};
use crate::parser::parse_where_expr;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

static COLUMN_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\.[A-Za-z_][A-Za-z0-9_]*$").expect("valid column pattern")
});

/// How a WHERE clause will be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum WherePlan {
    /// No WHERE clause.
    Empty,
    /// Contains a subquery; emitted as literal SQL.
    Literal(String),
    /// Contains `OR`.
    Disjunction(WhereExpr),
    /// A conjunction with LIKE/IN/BETWEEN/NULL (or negated) conditions.
    Decomposed(ConditionSet),
    /// A conjunction of plain comparisons.
    Consolidated(Vec<SimpleCondition>),
    /// Anything else, rendered from the tree.
    Raw(WhereExpr),
}

impl WherePlan {
    /// Pick a plan: subquery, then disjunction, then decomposition, then
    /// consolidated comparisons, then raw.
    pub fn for_clause(where_clause: &str) -> Self {
        let text = where_clause.trim();
        if text.is_empty() {
            return WherePlan::Empty;
        }
        if has_subquery(text) {
            return WherePlan::Literal(text.to_string());
        }
        let Some(tree) = parse_where_expr(text) else {
            return WherePlan::Empty;
        };
        if tree.has_or() {
            return WherePlan::Disjunction(tree);
        }
        let decomposable = tree.conjunct_predicates().is_some_and(|preds| {
            preds
                .iter()
                .all(|p| !matches!(p, Predicate::Raw { .. } | Predicate::InSubquery { .. }))
        });
        if !decomposable {
            return WherePlan::Raw(tree);
        }
        if is_simple_equality(text) {
            WherePlan::Consolidated(parse_simple_conditions(text))
        } else {
            WherePlan::Decomposed(parse_complex_conditions(text))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WherePlan::Empty => "empty",
            WherePlan::Literal(_) => "literal",
            WherePlan::Disjunction(_) => "disjunction",
            WherePlan::Decomposed(_) => "decomposed",
            WherePlan::Consolidated(_) => "consolidated",
            WherePlan::Raw(_) => "raw",
        }
    }
}

/// Leaf renderers for one ORM's WHERE syntax.
pub trait WhereDialect {
    /// One rendered condition, before assembly.
    type Clause;

    fn render_equality(&self, condition: &SimpleCondition) -> Self::Clause;

    fn render_like(&self, condition: &LikeCondition) -> Self::Clause;

    fn render_in(&self, condition: &InCondition) -> Self::Clause;

    fn render_between(&self, condition: &BetweenCondition) -> Self::Clause;

    fn render_null(&self, condition: &NullCheck) -> Self::Clause;

    /// Join rendered clauses into the final WHERE text.
    fn assemble(&self, clauses: Vec<Self::Clause>) -> String;

    fn render_consolidated(&self, conditions: &[SimpleCondition]) -> String;

    fn render_literal(&self, sql: &str) -> String;

    fn render_raw(&self, expr: &WhereExpr) -> String;

    fn render_disjunction(&self, expr: &WhereExpr) -> String {
        self.render_raw(expr)
    }

    fn render_empty(&self) -> String {
        String::new()
    }
}

/// Render a WHERE clause through `dialect`. Decomposed conditions are emitted
/// LIKE, IN, BETWEEN, NULL, then simple comparisons.
pub fn render_where<D: WhereDialect + ?Sized>(dialect: &D, where_clause: &str) -> String {
    let plan = WherePlan::for_clause(where_clause);
    debug!(plan = plan.name(), "rendering WHERE clause");
    match plan {
        WherePlan::Empty => dialect.render_empty(),
        WherePlan::Literal(sql) => dialect.render_literal(&sql),
        WherePlan::Disjunction(expr) => dialect.render_disjunction(&expr),
        WherePlan::Raw(expr) => dialect.render_raw(&expr),
        WherePlan::Consolidated(conditions) => dialect.render_consolidated(&conditions),
        WherePlan::Decomposed(set) => {
            let mut clauses = Vec::new();
            clauses.extend(set.like.iter().map(|c| dialect.render_like(c)));
            clauses.extend(set.in_list.iter().map(|c| dialect.render_in(c)));
            clauses.extend(set.between.iter().map(|c| dialect.render_between(c)));
            clauses.extend(set.null.iter().map(|c| dialect.render_null(c)));
            clauses.extend(set.simple.iter().map(|c| dialect.render_equality(c)));
            dialect.assemble(clauses)
        }
    }
}

/// A plain identifier, usable as a Ruby symbol or JavaScript property name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// `table.column` text.
pub fn is_column_ref(text: &str) -> bool {
    COLUMN_REF.is_match(text.trim())
}

/// Ruby symbol: `:name`, or a string for anything else.
pub fn ruby_symbol(name: &str) -> String {
    if is_identifier(name) {
        format!(":{}", name)
    } else {
        crate::values::quote(name)
    }
}

/// Ruby hash key: `name:` or `"table.column":`.
pub fn ruby_key(name: &str) -> String {
    if is_identifier(name) {
        format!("{}:", name)
    } else {
        format!("{}:", crate::values::quote(name))
    }
}

/// JavaScript property key, quoted when not an identifier.
pub fn js_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        crate::values::quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_selection() {
        assert_eq!(WherePlan::for_clause("").name(), "empty");
        assert_eq!(WherePlan::for_clause("id IN (SELECT id FROM t)").name(), "literal");
        assert_eq!(WherePlan::for_clause("a = 1 OR b = 2").name(), "disjunction");
        assert_eq!(WherePlan::for_clause("a = 1 AND b > 2").name(), "consolidated");
        assert_eq!(WherePlan::for_clause("a LIKE 'x%' AND b = 2").name(), "decomposed");
        assert_eq!(WherePlan::for_clause("NOT a = 1").name(), "decomposed");
        assert_eq!(WherePlan::for_clause("a = 1 AND EXISTS (x)").name(), "raw");
        assert_eq!(WherePlan::for_clause("NOT (a = 1 AND b = 2)").name(), "raw");
    }

    #[test]
    fn test_identifier_helpers() {
        assert_eq!(ruby_symbol("age"), ":age");
        assert_eq!(ruby_symbol("posts.id"), "\"posts.id\"");
        assert_eq!(ruby_key("age"), "age:");
        assert_eq!(ruby_key("posts.id"), "\"posts.id\":");
        assert_eq!(js_key("$posts.id$"), "\"$posts.id$\"");
        assert!(is_column_ref("users.id"));
        assert!(!is_column_ref("'users.id'"));
    }
}
