//! Table and clause text helpers: singularization, model naming and
//! clause removal.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "metadata",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("sexes", "sex"),
    ("moves", "move"),
    ("zombies", "zombie"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("geese", "goose"),
];

/// Suffix rules, first match wins.
static SINGULAR_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(database)s$", "$1"),
        (r"(quiz)zes$", "$1"),
        (r"(matr)ices$", "${1}ix"),
        (r"(vert|ind)ices$", "${1}ex"),
        (r"^(ox)en", "$1"),
        (r"(alias|status)(es)?$", "$1"),
        (r"(octop|vir)(us|i)$", "${1}us"),
        (r"^(a)x[ie]s$", "${1}xis"),
        (r"(cris|test)(is|es)$", "${1}is"),
        (r"(shoe)s$", "$1"),
        (r"(o)es$", "$1"),
        (r"(bus)(es)?$", "$1"),
        (r"^(m|l)ice$", "${1}ouse"),
        (r"(x|ch|ss|sh)es$", "$1"),
        (r"(m)ovies$", "${1}ovie"),
        (r"(s)eries$", "${1}eries"),
        (r"([^aeiouy]|qu)ies$", "${1}y"),
        (r"([lr])ves$", "${1}f"),
        (r"(tive)s$", "$1"),
        (r"(hive)s$", "$1"),
        (r"([^f])ves$", "${1}fe"),
        (r"(^analy)(sis|ses)$", "${1}sis"),
        (
            r"((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(sis|ses)$",
            "${1}sis",
        ),
        (r"([ti])a$", "${1}um"),
        (r"(ss)$", "$1"),
        (r"s$", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid inflection rule");
        (re, replacement)
    })
    .collect()
});

/// Singular form of a (possibly snake_case) plural noun. Only the last
/// underscore-separated word is inflected.
pub fn singularize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(idx) => (&word[..=idx], &word[idx + 1..]),
        None => ("", word),
    };
    format!("{}{}", head, singularize_word(last))
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return match_first_case(word, singular);
    }
    for (rule, replacement) in SINGULAR_RULES.iter() {
        if rule.is_match(word) {
            return rule.replace(word, *replacement).into_owned();
        }
    }
    word.to_string()
}

fn match_first_case(original: &str, replacement: &str) -> String {
    if original.starts_with(|c: char| c.is_ascii_uppercase()) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Model class name for a table: singular, then PascalCase.
///
/// ```
/// use sql2orm::inflect::to_model_name;
///
/// assert_eq!(to_model_name("user_profiles"), "UserProfile");
/// assert_eq!(to_model_name("categories"), "Category");
/// ```
pub fn to_model_name(table: &str) -> String {
    singularize(table)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| capitalize(&part.to_ascii_lowercase()))
        .collect()
}

/// Remove the first occurrence of `clause` from `where_clause`, together with
/// one adjacent `AND`/`OR` on either side, leaving a single space.
pub fn remove_clause(where_clause: &str, clause: &str) -> String {
    if clause.is_empty() {
        return where_clause.to_string();
    }
    let pattern = format!(
        r"\s*(?:AND|OR)?\s*{}\s*(?:AND|OR)?\s*",
        regex::escape(clause)
    );
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replacen(where_clause, 1, " ").into_owned(),
        Err(_) => where_clause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize_regular() {
        assert_eq!(singularize("posts"), "post");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("wolves"), "wolf");
        assert_eq!(singularize("class"), "class");
    }

    #[test]
    fn test_singularize_irregular_and_uncountable() {
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("sheep"), "sheep");
        assert_eq!(singularize("line_items"), "line_item");
        assert_eq!(singularize("sales_people"), "sales_person");
    }

    #[test]
    fn test_to_model_name() {
        assert_eq!(to_model_name("user_profiles"), "UserProfile");
        assert_eq!(to_model_name("categories"), "Category");
        assert_eq!(to_model_name("posts"), "Post");
        assert_eq!(to_model_name("teams"), "Team");
        assert_eq!(to_model_name("USERS"), "User");
        assert_eq!(to_model_name(""), "");
    }

    #[test]
    fn test_remove_clause() {
        let w = r#"age = 25 AND name = "John""#;
        assert_eq!(remove_clause(w, "age = 25"), r#" name = "John""#);
        assert_eq!(remove_clause("age = 25 OR name = 'x'", "name = 'x'"), "age = 25 ");
        assert_eq!(remove_clause(w, "status = 1"), w);
    }

    #[test]
    fn test_remove_clause_escapes_metacharacters() {
        assert_eq!(
            remove_clause("id IN (1, 2) AND x = 1", "id IN (1, 2)"),
            " x = 1"
        );
    }
}
