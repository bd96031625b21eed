use serde::Serialize;

use crate::transpiler::Target;
use crate::values::quote;

/// A literal token after type sniffing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    /// Empty input token.
    Empty,
    Null,
    Boolean(bool),
    /// Integral literal, rendered with every digit.
    Integer(i128),
    /// Decimal literal, or an integer too wide for `i128`.
    Number(f64),
    String(String),
}

impl TypedValue {
    /// Render as a literal of the target language.
    pub fn render(&self, target: Target) -> String {
        match self {
            TypedValue::Empty => "\"\"".to_string(),
            TypedValue::Null => match target {
                Target::ActiveRecord => "nil".to_string(),
                Target::Sequelize => "null".to_string(),
            },
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Integer(n) => n.to_string(),
            TypedValue::Number(n) => format_number(*n),
            TypedValue::String(s) => quote(s),
        }
    }
}

/// Integral values print without a fractional part.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_per_target() {
        assert_eq!(TypedValue::Null.render(Target::ActiveRecord), "nil");
        assert_eq!(TypedValue::Null.render(Target::Sequelize), "null");
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(TypedValue::Number(42.0).render(Target::ActiveRecord), "42");
        assert_eq!(
            TypedValue::Integer(12345678901234567891).render(Target::Sequelize),
            "12345678901234567891"
        );
        assert_eq!(TypedValue::Number(-3.5).render(Target::Sequelize), "-3.5");
        assert_eq!(TypedValue::Number(-0.0).render(Target::Sequelize), "0");
    }

    #[test]
    fn test_string_is_escaped() {
        let v = TypedValue::String("say \"hi\"".to_string());
        assert_eq!(v.render(Target::ActiveRecord), r#""say \"hi\"""#);
    }
}
