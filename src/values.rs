//! Literal sniffing for raw SQL value tokens.
//!
//! Priority is fixed: empty, quoted string, `NULL`, boolean, number, and
//! finally any other token is treated as a string.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::TypedValue;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)$").expect("valid number pattern"));

/// Type a raw literal token.
///
/// ```
/// use sql2orm::ast::TypedValue;
/// use sql2orm::values::parse_value;
///
/// assert_eq!(parse_value("42"), TypedValue::Integer(42));
/// assert_eq!(parse_value("'abc'"), TypedValue::String("abc".to_string()));
/// ```
pub fn parse_value(raw: &str) -> TypedValue {
    let token = raw.trim();
    if token.is_empty() {
        return TypedValue::Empty;
    }
    if let Some(inner) = unquote(token) {
        return TypedValue::String(inner);
    }
    if token.eq_ignore_ascii_case("null") {
        return TypedValue::Null;
    }
    if token.eq_ignore_ascii_case("true") {
        return TypedValue::Boolean(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return TypedValue::Boolean(false);
    }
    if NUMBER.is_match(token) {
        if let Ok(n) = token.parse::<i128>() {
            return TypedValue::Integer(n);
        }
        if let Ok(n) = token.parse::<f64>() {
            return TypedValue::Number(n);
        }
    }
    TypedValue::String(token.to_string())
}

/// Strip one pair of matching outer quotes, unescaping doubled quotes.
pub fn unquote(token: &str) -> Option<String> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if (first == '\'' || first == '"') && first == last {
        let inner = &token[1..token.len() - 1];
        let doubled: String = [first, first].iter().collect();
        return Some(inner.replace(&doubled, &first.to_string()));
    }
    None
}

/// Backslash-escape `\` and `"` for a double-quoted literal.
pub fn escape_double_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Double-quoted string literal, valid in both Ruby and JavaScript.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", escape_double_quoted(text))
}

/// A calendar-valid `YYYY-MM-DD` date.
pub fn is_iso_date(text: &str) -> bool {
    text.len() == 10 && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}
