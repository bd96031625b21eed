//! Recursive-descent grammar for WHERE conditions.
//!
//! ```text
//! or_expr   := and_expr (OR and_expr)*
//! and_expr  := unary (AND unary)*
//! unary     := NOT unary | primary
//! primary   := '(' or_expr ')' | predicate | raw
//! predicate := field ( [NOT] LIKE|ILIKE 'pattern'
//!                    | [NOT] IN ( list | SELECT ... )
//!                    | [NOT] BETWEEN operand AND operand
//!                    | IS [NOT] NULL
//!                    | op operand )
//! ```
//!
//! Text that matches no predicate becomes a raw leaf spanning up to the next
//! top-level `AND`/`OR`, so parsing never fails on non-empty input.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{multispace0, multispace1},
    combinator::{map, opt, value},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
};
use once_cell::sync::Lazy;
use regex::Regex;

use super::base::*;
use crate::ast::{ComparisonOp, Predicate, WhereExpr};
use crate::parser::scan::{mask_quotes, split_top_level};
use crate::values::unquote;

static SELECT_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bselect\b").expect("valid select pattern"));

/// Parse a WHERE clause into an expression tree. `None` for blank input.
pub fn parse_where_expr(input: &str) -> Option<WhereExpr> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expr = match or_expr(trimmed) {
        Ok((rest, expr)) => {
            let rest = rest.trim();
            if rest.is_empty() {
                expr
            } else {
                tracing::debug!(rest, "trailing text kept as raw condition");
                append_conjunct(expr, WhereExpr::raw(rest))
            }
        }
        Err(_) => WhereExpr::raw(trimmed),
    };
    Some(expr)
}

fn append_conjunct(expr: WhereExpr, extra: WhereExpr) -> WhereExpr {
    match expr {
        WhereExpr::And(mut children) => {
            children.push(extra);
            WhereExpr::And(children)
        }
        other => WhereExpr::And(vec![other, extra]),
    }
}

fn logical<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    delimited(multispace0, keyword(kw), multispace0)
}

fn or_expr(input: &str) -> IResult<&str, WhereExpr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(logical("or"), and_expr))(input)?;
    Ok((input, combine(first, rest, WhereExpr::Or)))
}

fn and_expr(input: &str) -> IResult<&str, WhereExpr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(logical("and"), unary))(input)?;
    Ok((input, combine(first, rest, WhereExpr::And)))
}

fn combine(
    first: WhereExpr,
    rest: Vec<WhereExpr>,
    wrap: fn(Vec<WhereExpr>) -> WhereExpr,
) -> WhereExpr {
    if rest.is_empty() {
        return first;
    }
    let mut children = Vec::with_capacity(rest.len() + 1);
    children.push(first);
    children.extend(rest);
    wrap(children)
}

fn unary(input: &str) -> IResult<&str, WhereExpr> {
    alt((
        map(preceded(terminated(keyword("not"), multispace0), unary), |e| {
            WhereExpr::Not(Box::new(e))
        }),
        primary,
    ))(input)
}

fn primary(input: &str) -> IResult<&str, WhereExpr> {
    alt((
        terminated(group, at_boundary),
        map(terminated(predicate, at_boundary), WhereExpr::Leaf),
        raw_leaf,
    ))(input)
}

fn group(input: &str) -> IResult<&str, WhereExpr> {
    let (rest, body) = paren_body(input)?;
    if body.trim().is_empty() || starts_with_select(body) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    let (leftover, expr) = delimited(multispace0, or_expr, multispace0)(body)?;
    if !leftover.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((rest, expr))
}

fn raw_leaf(input: &str) -> IResult<&str, WhereExpr> {
    map(operand, WhereExpr::raw)(input)
}

/// Succeeds without consuming when the next token ends a condition.
fn at_boundary(input: &str) -> IResult<&str, ()> {
    let rest = input.trim_start();
    if rest.is_empty() || rest.starts_with(')') || starts_with_logical(rest) {
        Ok((input, ()))
    } else {
        Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)))
    }
}

fn starts_with_select(text: &str) -> bool {
    keyword("select")(text.trim_start()).is_ok()
}

/// `SELECT` appears as a word outside quoted text.
pub fn contains_select(text: &str) -> bool {
    SELECT_KEYWORD.is_match(&mask_quotes(text))
}

enum Tail {
    Like { not: bool, pattern: String, case_insensitive: bool },
    In { not: bool, body: String },
    Between { not: bool, start: String, end: String },
    IsNull { not: bool },
    Compare { op: ComparisonOp, value: String },
}

fn predicate(input: &str) -> IResult<&str, Predicate> {
    let (input, field) = field_ref(input)?;
    let (input, _) = multispace0(input)?;
    let (input, tail) = alt((like_tail, in_tail, between_tail, null_tail, compare_tail))(input)?;

    let predicate = match tail {
        Tail::Like {
            not,
            pattern,
            case_insensitive,
        } => Predicate::Like {
            field,
            not,
            pattern,
            case_insensitive,
        },
        Tail::In { not, body } if contains_select(&body) => Predicate::InSubquery {
            field,
            not,
            subquery: body.trim().to_string(),
        },
        Tail::In { not, body } => Predicate::In {
            field,
            not,
            values: split_top_level(&body, ','),
        },
        Tail::Between { not, start, end } => Predicate::Between {
            field,
            not,
            start,
            end,
        },
        Tail::IsNull { not } => Predicate::IsNull { field, not },
        Tail::Compare { op, value } => Predicate::Comparison { field, op, value },
    };
    Ok((input, predicate))
}

fn negation(input: &str) -> IResult<&str, bool> {
    map(opt(terminated(keyword("not"), multispace1)), |n| n.is_some())(input)
}

fn like_tail(input: &str) -> IResult<&str, Tail> {
    let (input, not) = negation(input)?;
    let (input, case_insensitive) =
        alt((value(true, keyword("ilike")), value(false, keyword("like"))))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, literal) = string_literal(input)?;
    let pattern = unquote(literal).unwrap_or_else(|| literal.to_string());
    Ok((
        input,
        Tail::Like {
            not,
            pattern,
            case_insensitive,
        },
    ))
}

fn in_tail(input: &str) -> IResult<&str, Tail> {
    let (input, not) = negation(input)?;
    let (input, _) = terminated(keyword("in"), multispace0)(input)?;
    let (input, body) = paren_body(input)?;
    Ok((
        input,
        Tail::In {
            not,
            body: body.to_string(),
        },
    ))
}

fn between_tail(input: &str) -> IResult<&str, Tail> {
    let (input, (not, _, _, start, _, end)) = tuple((
        negation,
        keyword("between"),
        multispace1,
        operand,
        logical("and"),
        operand,
    ))(input)?;
    Ok((
        input,
        Tail::Between {
            not,
            start: start.to_string(),
            end: end.to_string(),
        },
    ))
}

fn null_tail(input: &str) -> IResult<&str, Tail> {
    let (input, (_, _, not, _)) =
        tuple((keyword("is"), multispace1, negation, keyword("null")))(input)?;
    Ok((input, Tail::IsNull { not }))
}

fn comparison_op(input: &str) -> IResult<&str, ComparisonOp> {
    alt((
        value(ComparisonOp::Gte, tag(">=")),
        value(ComparisonOp::Lte, tag("<=")),
        value(ComparisonOp::NotEq, tag("!=")),
        value(ComparisonOp::NotEq, tag("<>")),
        value(ComparisonOp::Eq, tag("=")),
        value(ComparisonOp::Gt, tag(">")),
        value(ComparisonOp::Lt, tag("<")),
    ))(input)
}

fn compare_tail(input: &str) -> IResult<&str, Tail> {
    let (input, (op, _, value)) = tuple((comparison_op, multispace0, operand))(input)?;
    Ok((
        input,
        Tail::Compare {
            op,
            value: value.to_string(),
        },
    ))
}
