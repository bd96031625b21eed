//! Aggregate short-circuit detection.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::ast::ParsedQuery;

static AGGREGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(COUNT|SUM|AVG|MIN|MAX)\s*\(\s*(DISTINCT\s+)?([^)]+?)\s*\)$")
        .expect("valid aggregate pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

/// `FUNC([DISTINCT] column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub func: AggregateFunc,
    pub distinct: bool,
    /// Argument text: `*`, `id` or `posts.id`.
    pub column: String,
}

impl Aggregate {
    /// Recognize a whole column expression as one aggregate call.
    pub fn parse(expr: &str) -> Option<Self> {
        let caps = AGGREGATE.captures(expr.trim())?;
        let func = match caps[1].to_ascii_uppercase().as_str() {
            "COUNT" => AggregateFunc::Count,
            "SUM" => AggregateFunc::Sum,
            "AVG" => AggregateFunc::Avg,
            "MIN" => AggregateFunc::Min,
            _ => AggregateFunc::Max,
        };
        Some(Self {
            func,
            distinct: caps.get(2).is_some(),
            column: caps[3].trim().to_string(),
        })
    }

    /// The single scalar aggregate of a SELECT without GROUP BY or HAVING.
    pub fn scalar(query: &ParsedQuery) -> Option<Self> {
        if query.columns.len() != 1 || !query.group_by.is_empty() || query.has_having() {
            return None;
        }
        Self::parse(&query.columns[0].name)
    }

    pub fn is_count_all(&self) -> bool {
        self.func == AggregateFunc::Count && self.column == "*"
    }

    /// Text inside the parentheses, e.g. `DISTINCT id`.
    pub fn argument(&self) -> String {
        if self.distinct {
            format!("DISTINCT {}", self.column)
        } else {
            self.column.clone()
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{}({})", self.func.as_str(), self.argument())
    }
}
