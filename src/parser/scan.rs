//! Quote- and parenthesis-aware text scanning.
//!
//! Clause patterns run over a *masked* copy of the statement in which quoted
//! literals (and, for [`mask_nested`], everything inside parentheses) are
//! blanked with spaces. Byte offsets are preserved, so a match in the mask
//! slices the same span out of the original text.

fn blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

fn emit(out: &mut String, c: char, hidden: bool) {
    if hidden {
        blank(out, c);
    } else {
        out.push(c);
    }
}

fn mask(sql: &str, blank_nested: bool) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        let hidden = blank_nested && depth > 0;
        if let Some(q) = quote {
            if c == '\\' {
                blank(&mut out, c);
                if let Some(escaped) = chars.next() {
                    blank(&mut out, escaped);
                }
                continue;
            }
            if c == q {
                if chars.peek() == Some(&q) {
                    blank(&mut out, c);
                    chars.next();
                    blank(&mut out, q);
                    continue;
                }
                quote = None;
                emit(&mut out, c, hidden);
                continue;
            }
            blank(&mut out, c);
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                emit(&mut out, c, hidden);
            }
            '(' => {
                emit(&mut out, c, hidden);
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                emit(&mut out, c, blank_nested && depth > 0);
            }
            _ => emit(&mut out, c, hidden),
        }
    }
    out
}

/// Blank quoted literals and the contents of every parenthesized group.
pub fn mask_nested(sql: &str) -> String {
    mask(sql, true)
}

/// Blank quoted literals only.
pub fn mask_quotes(sql: &str) -> String {
    mask(sql, false)
}

/// Split on `sep` outside quotes and parentheses, trimming each piece and
/// skipping empty ones.
pub fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let masked = mask_nested(text);
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, c) in masked.char_indices() {
        if c == sep {
            parts.push(&text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Byte index of the `)` closing the `(` at `open`.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let masked = mask_nested(&text[open..]);
    masked
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == ')')
        .map(|(idx, _)| open + idx)
}

/// Byte index of the first `c` outside quotes and parentheses.
pub fn find_top_level(text: &str, c: char) -> Option<usize> {
    mask_nested(text).find(c)
}

/// Strip surrounding backticks from an identifier.
pub fn strip_backticks(ident: &str) -> &str {
    ident.trim_matches('`')
}
