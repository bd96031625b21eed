//! WHERE expression tree and the condition categories derived from it.

use serde::Serialize;
use std::fmt;

use super::values::TypedValue;

/// The six comparison operators (`<>` is read as `!=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
        }
    }

    /// Operator that selects exactly the rows this one rejects.
    pub fn negate(&self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::NotEq,
            ComparisonOp::NotEq => ComparisonOp::Eq,
            ComparisonOp::Gte => ComparisonOp::Lt,
            ComparisonOp::Lte => ComparisonOp::Gt,
            ComparisonOp::Gt => ComparisonOp::Lte,
            ComparisonOp::Lt => ComparisonOp::Gte,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf of the WHERE tree. Operands are kept as raw SQL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Comparison {
        field: String,
        op: ComparisonOp,
        value: String,
    },
    Like {
        field: String,
        not: bool,
        pattern: String,
        case_insensitive: bool,
    },
    In {
        field: String,
        not: bool,
        values: Vec<String>,
    },
    InSubquery {
        field: String,
        not: bool,
        subquery: String,
    },
    Between {
        field: String,
        not: bool,
        start: String,
        end: String,
    },
    IsNull {
        field: String,
        not: bool,
    },
    /// Text the grammar could not classify.
    Raw { text: String },
}

impl Predicate {
    pub fn field(&self) -> Option<&str> {
        match self {
            Predicate::Comparison { field, .. }
            | Predicate::Like { field, .. }
            | Predicate::In { field, .. }
            | Predicate::InSubquery { field, .. }
            | Predicate::Between { field, .. }
            | Predicate::IsNull { field, .. } => Some(field),
            Predicate::Raw { .. } => None,
        }
    }

    /// Logical negation, folded into the predicate. Raw text cannot be negated.
    pub fn negated(&self) -> Option<Predicate> {
        let mut p = self.clone();
        match &mut p {
            Predicate::Comparison { op, .. } => *op = op.negate(),
            Predicate::Like { not, .. }
            | Predicate::In { not, .. }
            | Predicate::InSubquery { not, .. }
            | Predicate::Between { not, .. }
            | Predicate::IsNull { not, .. } => *not = !*not,
            Predicate::Raw { .. } => return None,
        }
        Some(p)
    }
}

fn not_kw(not: bool) -> &'static str {
    if not { "NOT " } else { "" }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison { field, op, value } => write!(f, "{} {} {}", field, op, value),
            Predicate::Like {
                field,
                not,
                pattern,
                case_insensitive,
            } => {
                let kw = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(
                    f,
                    "{} {}{} '{}'",
                    field,
                    not_kw(*not),
                    kw,
                    pattern.replace('\'', "''")
                )
            }
            Predicate::In { field, not, values } => {
                write!(f, "{} {}IN ({})", field, not_kw(*not), values.join(", "))
            }
            Predicate::InSubquery {
                field,
                not,
                subquery,
            } => write!(f, "{} {}IN ({})", field, not_kw(*not), subquery),
            Predicate::Between {
                field,
                not,
                start,
                end,
            } => write!(f, "{} {}BETWEEN {} AND {}", field, not_kw(*not), start, end),
            Predicate::IsNull { field, not } => write!(f, "{} IS {}NULL", field, not_kw(*not)),
            Predicate::Raw { text } => f.write_str(text),
        }
    }
}

/// Boolean structure of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WhereExpr {
    And(Vec<WhereExpr>),
    Or(Vec<WhereExpr>),
    Not(Box<WhereExpr>),
    Leaf(Predicate),
}

impl WhereExpr {
    pub fn raw(text: impl Into<String>) -> Self {
        WhereExpr::Leaf(Predicate::Raw { text: text.into() })
    }

    /// True if any `OR` appears in the tree.
    pub fn has_or(&self) -> bool {
        match self {
            WhereExpr::Or(_) => true,
            WhereExpr::And(children) => children.iter().any(|c| c.has_or()),
            WhereExpr::Not(inner) => inner.has_or(),
            WhereExpr::Leaf(_) => false,
        }
    }

    /// Top-level `AND` operands, flattening nested conjunctions.
    pub fn conjuncts(&self) -> Vec<&WhereExpr> {
        match self {
            WhereExpr::And(children) => children.iter().flat_map(|c| c.conjuncts()).collect(),
            other => vec![other],
        }
    }

    /// Every leaf, depth first.
    pub fn leaves(&self) -> Vec<&Predicate> {
        match self {
            WhereExpr::And(children) | WhereExpr::Or(children) => {
                children.iter().flat_map(|c| c.leaves()).collect()
            }
            WhereExpr::Not(inner) => inner.leaves(),
            WhereExpr::Leaf(p) => vec![p],
        }
    }

    /// The conjunction as plain predicates, folding `NOT <predicate>`.
    /// `None` when some conjunct is an `OR`, a negated group or negated raw text.
    pub fn conjunct_predicates(&self) -> Option<Vec<Predicate>> {
        self.conjuncts()
            .into_iter()
            .map(|c| match c {
                WhereExpr::Leaf(p) => Some(p.clone()),
                WhereExpr::Not(inner) => match inner.as_ref() {
                    WhereExpr::Leaf(p) => p.negated(),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parent_is_and: bool) -> fmt::Result {
        match self {
            WhereExpr::Or(_) if parent_is_and => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for WhereExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereExpr::And(children) | WhereExpr::Or(children) => {
                let is_and = matches!(self, WhereExpr::And(_));
                let joiner = if is_and { " AND " } else { " OR " };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    child.fmt_child(f, is_and)?;
                }
                Ok(())
            }
            WhereExpr::Not(inner) => match inner.as_ref() {
                WhereExpr::Leaf(p) => write!(f, "NOT {}", p),
                other => write!(f, "NOT ({})", other),
            },
            WhereExpr::Leaf(p) => write!(f, "{}", p),
        }
    }
}

/// `field op value` with a typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleCondition {
    pub field: String,
    pub operator: ComparisonOp,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeCondition {
    pub field: String,
    pub not: bool,
    pub pattern: String,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InCondition {
    pub field: String,
    pub not: bool,
    pub values: Vec<TypedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetweenCondition {
    pub field: String,
    pub not: bool,
    pub start: TypedValue,
    pub end: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCheck {
    pub field: String,
    pub not: bool,
}

/// `field [NOT] IN (SELECT ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubqueryCondition {
    pub field: String,
    pub not: bool,
    pub subquery: String,
    /// The whole predicate as SQL text.
    pub full_match: String,
}

/// A WHERE clause bucketed by condition category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionSet {
    pub like: Vec<LikeCondition>,
    #[serde(rename = "in")]
    pub in_list: Vec<InCondition>,
    pub between: Vec<BetweenCondition>,
    pub null: Vec<NullCheck>,
    pub simple: Vec<SimpleCondition>,
    /// Fragments that matched no category.
    pub unparsed: Vec<String>,
}

impl ConditionSet {
    /// No condition in any category.
    pub fn is_empty(&self) -> bool {
        self.like.is_empty()
            && self.in_list.is_empty()
            && self.between.is_empty()
            && self.null.is_empty()
            && self.simple.is_empty()
    }
}
