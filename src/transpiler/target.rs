use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::OrmGenerator;
use super::orm::{ActiveRecordGenerator, SequelizeGenerator};
use crate::error::ConvertError;

/// Output ORM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Ruby on Rails ActiveRecord.
    #[serde(alias = "active_record")]
    ActiveRecord,
    /// Node.js Sequelize.
    Sequelize,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::ActiveRecord, Target::Sequelize];

    /// Entry generator for this target. Statements with joins are routed to
    /// the join generator internally.
    pub fn generator(&self) -> Box<dyn OrmGenerator> {
        match self {
            Target::ActiveRecord => Box::new(ActiveRecordGenerator),
            Target::Sequelize => Box::new(SequelizeGenerator),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Target::ActiveRecord => "activerecord",
            Target::Sequelize => "sequelize",
        }
    }

    /// A line comment in the target language.
    pub fn comment(&self, text: &str) -> String {
        match self {
            Target::ActiveRecord => format!("# {}", text),
            Target::Sequelize => format!("// {}", text),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activerecord" | "active_record" | "active-record" | "ar" | "rails" => {
                Ok(Target::ActiveRecord)
            }
            "sequelize" | "sq" => Ok(Target::Sequelize),
            _ => Err(ConvertError::UnknownTarget(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("ActiveRecord".parse::<Target>().unwrap(), Target::ActiveRecord);
        assert_eq!("active_record".parse::<Target>().unwrap(), Target::ActiveRecord);
        assert_eq!("sequelize".parse::<Target>().unwrap(), Target::Sequelize);
        assert!("django".parse::<Target>().is_err());
    }

    #[test]
    fn test_comment_syntax() {
        assert_eq!(Target::ActiveRecord.comment("x"), "# x");
        assert_eq!(Target::Sequelize.comment("x"), "// x");
    }
}
