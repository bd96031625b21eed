//! Clause extraction over the masked statement text.
//!
//! Every pattern runs against [`super::scan::mask_nested`] output, so keywords inside
//! quoted literals or parenthesized subqueries never start or end a clause.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::scan::{find_top_level, matching_paren, split_top_level, strip_backticks};
use crate::ast::*;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("valid clause pattern"));
    };
}

pattern!(STATEMENT, r"(?i)^\s*(select|insert|update|delete)\b");
pattern!(SELECT_LIST, r"(?i)^\s*select\s+(distinct\s+)?");
pattern!(FROM_KEYWORD, r"(?i)\bfrom\b");
pattern!(
    FROM_TABLE,
    r"(?i)\bfrom\s+(?:`?\w+`?\.)?`?([A-Za-z_]\w*)`?(?:\s+(?:as\s+)?([A-Za-z_]\w*))?"
);
pattern!(INTO_TABLE, r"(?i)\binto\s+(?:`?\w+`?\.)?`?([A-Za-z_]\w*)`?");
pattern!(
    UPDATE_TABLE,
    r"(?i)^\s*update\s+(?:`?\w+`?\.)?`?([A-Za-z_]\w*)`?(?:\s+(?:as\s+)?([A-Za-z_]\w*))?"
);
pattern!(
    JOIN,
    r"(?i)\b((?:(inner|cross)\s+|(left|right|full)(\s+outer)?\s+)?join)\s+(?:`?\w+`?\.)?`?([A-Za-z_]\w*)`?(?:\s+(?:as\s+)?([A-Za-z_]\w*))?"
);
pattern!(ON_KEYWORD, r"(?i)^\s+on\b");
pattern!(
    JOIN_END,
    r"(?i)\b(?:(?:inner|cross|left|right|full)\s+(?:outer\s+)?)?join\b|\b(?:where|group\s+by|order\s+by|having|limit)\b|;"
);
pattern!(WHERE_KEYWORD, r"(?i)\bwhere\b");
pattern!(WHERE_END, r"(?i)\b(?:group\s+by|order\s+by|having|limit)\b|;");
pattern!(GROUP_BY, r"(?i)\bgroup\s+by\b");
pattern!(GROUP_END, r"(?i)\b(?:having|order\s+by|limit)\b|;");
pattern!(HAVING, r"(?i)\bhaving\b");
pattern!(HAVING_END, r"(?i)\b(?:order\s+by|limit)\b|;");
pattern!(ORDER_BY, r"(?i)\border\s+by\b");
pattern!(ORDER_END, r"(?i)\b(?:limit|offset)\b|;");
pattern!(
    LIMIT,
    r"(?i)\blimit\s+(\d+)(?:\s*,\s*(\d+))?(?:\s+offset\s+(\d+))?"
);
pattern!(OFFSET, r"(?i)\boffset\s+(\d+)");
pattern!(SET_KEYWORD, r"(?i)\bset\b");
pattern!(SET_END, r"(?i)\bwhere\b|;");
pattern!(VALUES, r"(?i)\bvalues\s*\(");
pattern!(INSERT_COLUMNS, r"(?i)\binto\s+(?:`?\w+`?\.)?`?\w+`?\s*\(");
pattern!(COLUMN_ALIAS, r#"(?is)^(.+?)\s+as\s+[`"]?([A-Za-z_]\w*)[`"]?$"#);
pattern!(QUALIFIED, r"^`?([A-Za-z_]\w*)`?\.`?([A-Za-z_]\w*|\*)`?$");
pattern!(ORDER_TERM, r"(?is)^(.+?)(?:\s+(asc|desc))?(?:\s+nulls\s+(?:first|last))?$");

/// Words that can follow a table name without being its alias.
const RESERVED: &[&str] = &[
    "where", "join", "inner", "left", "right", "full", "cross", "outer", "natural", "on",
    "using", "group", "order", "having", "limit", "offset", "set", "values", "union",
    "returning", "select", "from",
];

fn alias_of(candidate: Option<regex::Match<'_>>) -> Option<String> {
    candidate
        .map(|m| m.as_str())
        .filter(|a| !RESERVED.iter().any(|r| r.eq_ignore_ascii_case(a)))
        .map(str::to_string)
}

/// Text of a clause that starts after `start` and runs to the first `end`
/// match or the end of the statement.
fn clause_body(sql: &str, masked: &str, start: &Regex, end: &Regex) -> Option<String> {
    let opening = start.find(masked)?;
    let body_start = opening.end();
    let body_end = end
        .find_at(masked, body_start)
        .map(|m| m.start())
        .unwrap_or(masked.len());
    let body = sql[body_start..body_end].trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// Leading keyword of the statement.
pub fn statement_type(sql: &str) -> QueryType {
    let keyword = STATEMENT
        .captures(sql)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase());
    match keyword.as_deref() {
        Some("select") => QueryType::Select,
        Some("insert") => QueryType::Insert,
        Some("update") => QueryType::Update,
        Some("delete") => QueryType::Delete,
        _ => QueryType::Unknown,
    }
}

/// Main table from `FROM`, `INTO` or `UPDATE`, in that priority.
pub fn main_table(masked: &str) -> Option<TableRef> {
    if let Some(caps) = FROM_TABLE.captures(masked) {
        return Some(TableRef {
            name: caps[1].to_string(),
            alias: alias_of(caps.get(2)),
        });
    }
    if let Some(caps) = INTO_TABLE.captures(masked) {
        return Some(TableRef {
            name: caps[1].to_string(),
            alias: None,
        });
    }
    UPDATE_TABLE.captures(masked).map(|caps| TableRef {
        name: caps[1].to_string(),
        alias: alias_of(caps.get(2)),
    })
}

/// Select list and the `DISTINCT` flag.
pub fn select_columns(sql: &str, masked: &str) -> (Vec<ColumnRef>, bool) {
    let Some(opening) = SELECT_LIST.captures(masked) else {
        return (Vec::new(), false);
    };
    let distinct = opening.get(1).is_some();
    let body_start = opening.get(0).map_or(0, |m| m.end());
    let body_end = FROM_KEYWORD
        .find_at(masked, body_start)
        .map(|m| m.start())
        .unwrap_or(masked.len());
    let columns = split_top_level(&sql[body_start..body_end], ',')
        .iter()
        .map(|item| parse_column(item))
        .collect();
    (columns, distinct)
}

fn parse_column(item: &str) -> ColumnRef {
    let (expr, alias) = match COLUMN_ALIAS.captures(item) {
        Some(caps) => (caps[1].trim().to_string(), Some(caps[2].to_string())),
        None => (item.trim().to_string(), None),
    };
    match QUALIFIED.captures(&expr) {
        Some(caps) => ColumnRef {
            name: caps[2].to_string(),
            table: Some(caps[1].to_string()),
            alias,
        },
        None => ColumnRef {
            name: strip_backticks(&expr).to_string(),
            table: None,
            alias,
        },
    }
}

/// Column list of `INSERT INTO t (a, b)`.
pub fn insert_columns(sql: &str, masked: &str) -> Vec<ColumnRef> {
    let Some(m) = INSERT_COLUMNS.find(masked) else {
        return Vec::new();
    };
    let open = m.end() - 1;
    match matching_paren(sql, open) {
        Some(close) => split_top_level(&sql[open + 1..close], ',')
            .iter()
            .map(|c| ColumnRef::named(strip_backticks(c)))
            .collect(),
        None => Vec::new(),
    }
}

/// Every `JOIN` clause, in statement order.
pub fn joins(sql: &str, masked: &str) -> Vec<JoinClause> {
    let mut found = Vec::new();
    for caps in JOIN.captures_iter(masked) {
        let kind = match (
            caps.get(2).map(|m| m.as_str().to_ascii_lowercase()),
            caps.get(3).map(|m| m.as_str().to_ascii_lowercase()),
        ) {
            (Some(k), _) if k == "inner" => JoinKind::Inner,
            (Some(_), _) => JoinKind::Cross,
            (None, Some(k)) if k == "left" => JoinKind::Left,
            (None, Some(k)) if k == "right" => JoinKind::Right,
            (None, Some(_)) => JoinKind::Full,
            (None, None) => JoinKind::Plain,
        };
        let table = &caps[5];
        let alias = alias_of(caps.get(6));
        let after = if alias.is_some() {
            caps.get(6).map_or(0, |m| m.end())
        } else {
            caps.get(5).map_or(0, |m| m.end())
        };
        let on = match ON_KEYWORD.find(&masked[after..]) {
            Some(on) => {
                let body_start = after + on.end();
                let body_end = JOIN_END
                    .find_at(masked, body_start)
                    .map(|m| m.start())
                    .unwrap_or(masked.len());
                sql[body_start..body_end].trim().to_string()
            }
            None => String::new(),
        };
        found.push(JoinClause {
            kind,
            outer: caps.get(4).is_some(),
            keyword: caps
                .get(1)
                .map(|m| sql[m.range()].split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default(),
            table: table.to_string(),
            alias,
            on,
        });
    }
    found
}

/// WHERE text, bounded by the next top-level clause keyword.
pub fn where_clause(sql: &str, masked: &str) -> String {
    clause_body(sql, masked, &WHERE_KEYWORD, &WHERE_END).unwrap_or_default()
}

pub fn group_by(sql: &str, masked: &str) -> Vec<GroupTerm> {
    let Some(body) = clause_body(sql, masked, &GROUP_BY, &GROUP_END) else {
        return Vec::new();
    };
    split_top_level(&body, ',')
        .into_iter()
        .map(|item| match QUALIFIED.captures(&item) {
            Some(caps) => GroupTerm {
                name: caps[2].to_string(),
                table: Some(caps[1].to_string()),
            },
            None => GroupTerm {
                name: strip_backticks(&item).to_string(),
                table: None,
            },
        })
        .collect()
}

pub fn having(sql: &str, masked: &str) -> Option<String> {
    clause_body(sql, masked, &HAVING, &HAVING_END)
}

pub fn order_by(sql: &str, masked: &str) -> Vec<OrderTerm> {
    let Some(body) = clause_body(sql, masked, &ORDER_BY, &ORDER_END) else {
        return Vec::new();
    };
    split_top_level(&body, ',')
        .into_iter()
        .filter_map(|item| {
            let caps = ORDER_TERM.captures(&item)?;
            let direction = match caps.get(2) {
                Some(d) if d.as_str().eq_ignore_ascii_case("desc") => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            let expr = caps[1].trim();
            Some(match QUALIFIED.captures(expr) {
                Some(q) => OrderTerm {
                    name: q[2].to_string(),
                    table: Some(q[1].to_string()),
                    direction,
                },
                None => OrderTerm {
                    name: strip_backticks(expr).to_string(),
                    table: None,
                    direction,
                },
            })
        })
        .collect()
}

/// `LIMIT n [OFFSET m]`, `LIMIT m, n` or a trailing `OFFSET m`.
pub fn limit(masked: &str) -> Option<Limit> {
    let caps = LIMIT.captures(masked)?;
    let first = row_count(&caps[1]);
    let (count, mut offset) = match caps.get(2) {
        Some(second) => (row_count(second.as_str()), Some(first)),
        None => (first, None),
    };
    if let Some(m) = caps.get(3) {
        offset = Some(row_count(m.as_str()));
    }
    if offset.is_none() {
        offset = OFFSET.captures(masked).map(|c| row_count(&c[1]));
    }
    Some(Limit { count, offset })
}

/// Digits of a LIMIT or OFFSET; values wider than `u64` saturate.
fn row_count(digits: &str) -> u64 {
    digits.parse().unwrap_or_else(|_| {
        warn!(digits, "row count out of range; using u64::MAX");
        u64::MAX
    })
}

/// Raw tokens of the first `VALUES (...)` row.
pub fn values(sql: &str, masked: &str) -> Option<Vec<String>> {
    let m = VALUES.find(masked)?;
    let open = m.end() - 1;
    let close = matching_paren(sql, open)?;
    Some(split_top_level(&sql[open + 1..close], ','))
}

/// `SET a = 1, b = 'x'` pairs.
pub fn set_clause(sql: &str, masked: &str) -> Option<Vec<Assignment>> {
    let body = clause_body(sql, masked, &SET_KEYWORD, &SET_END)?;
    let pairs = split_top_level(&body, ',')
        .into_iter()
        .filter_map(|pair| {
            let eq = find_top_level(&pair, '=')?;
            Some(Assignment {
                name: strip_backticks(pair[..eq].trim()).to_string(),
                value: pair[eq + 1..].trim().to_string(),
            })
        })
        .collect();
    Some(pairs)
}
