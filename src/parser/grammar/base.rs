//! Shared token parsers.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{map, not, opt, recognize},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, preceded, terminated},
};

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn fail(input: &str, kind: ErrorKind) -> nom::Err<Error<&str>> {
    nom::Err::Error(Error::new(input, kind))
}

/// Case-insensitive keyword that is not the prefix of a longer identifier.
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(satisfy(is_ident_char)))
}

/// Parse an identifier, optionally backtick-quoted.
pub fn identifier(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('`'), take_while1(is_ident_char), char('`')),
        recognize(pair(
            satisfy(|c: char| c.is_alphabetic() || c == '_'),
            take_while(is_ident_char),
        )),
    ))(input)
}

/// Parse `column` or `table.column`.
pub fn field_ref(input: &str) -> IResult<&str, String> {
    map(
        pair(identifier, opt(preceded(char('.'), identifier))),
        |(head, tail)| match tail {
            Some(column) => format!("{}.{}", head, column),
            None => head.to_string(),
        },
    )(input)
}

/// Parse a quoted literal and return it with its quotes.
/// Doubled quotes and backslash escapes stay inside the literal.
pub fn string_literal(input: &str) -> IResult<&str, &str> {
    let quote = match input.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(fail(input, ErrorKind::Char)),
    };
    let mut chars = input.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            if matches!(chars.peek(), Some((_, next)) if *next == quote) {
                chars.next();
                continue;
            }
            let end = idx + c.len_utf8();
            return Ok((&input[end..], &input[..end]));
        }
    }
    Err(fail(input, ErrorKind::Char))
}

/// Parse a parenthesized group and return its inner text.
pub fn paren_body(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('(') {
        return Err(fail(input, ErrorKind::Char));
    }
    match crate::parser::scan::matching_paren(input, 0) {
        Some(close) => Ok((&input[close + 1..], &input[1..close])),
        None => Err(fail(input, ErrorKind::Char)),
    }
}

/// True when `input` starts with `AND` or `OR` as a whole word.
pub fn starts_with_logical(input: &str) -> bool {
    keyword("and")(input).is_ok() || keyword("or")(input).is_ok()
}

/// Consume an operand: everything up to a top-level `AND`/`OR`, an
/// unbalanced `)`, or the end of input. Quotes and parentheses are skipped
/// whole. Trailing whitespace is left in the remainder.
pub fn operand(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut end = input.len();
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                if matches!(chars.peek(), Some((_, next)) if *next == q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = idx;
                break;
            }
            ')' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                if starts_with_logical(input[idx..].trim_start()) {
                    end = idx;
                    break;
                }
            }
            _ => {}
        }
    }

    let text = input[..end].trim_end();
    if text.is_empty() {
        return Err(fail(input, ErrorKind::TakeWhile1));
    }
    Ok((&input[text.len()..], text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_boundary() {
        assert!(keyword("and")("AND x").is_ok());
        assert!(keyword("and")("android").is_err());
        assert!(keyword("or")("order").is_err());
    }

    #[test]
    fn test_field_ref() {
        assert_eq!(field_ref("users.age > 1"), Ok((" > 1", "users.age".to_string())));
        assert_eq!(field_ref("`name` = 1"), Ok((" = 1", "name".to_string())));
        assert!(field_ref("1 = 1").is_err());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("'it''s' AND"), Ok((" AND", "'it''s'")));
        assert_eq!(string_literal(r#""a\"b" x"#), Ok((" x", r#""a\"b""#)));
        assert!(string_literal("'open").is_err());
    }

    #[test]
    fn test_operand_stops_at_logical() {
        assert_eq!(operand("18 AND 30"), Ok((" AND 30", "18")));
        assert_eq!(operand("'a and b' OR x"), Ok((" OR x", "'a and b'")));
        assert_eq!(operand("f(1 AND 2)) rest"), Ok((") rest", "f(1 AND 2)")));
        assert_eq!(operand("brand = 1"), Ok(("", "brand = 1")));
        assert!(operand(" AND x").is_err());
    }
}
