//! Optional CLI configuration.
//!
//! ```toml
//! target = "sequelize"   # activerecord | sequelize | all
//! color = false
//! log = "sql2orm=debug"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::transpiler::Target;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "sql2orm.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default target: a target name or `all`.
    pub target: String,
    pub color: bool,
    /// `tracing` filter directive used when `SQL2ORM_LOG` is unset.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: "all".to_string(),
            color: true,
            log: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `explicit`, else `./sql2orm.toml`, else the user config
    /// directory. No file at all yields the defaults; an explicit path that
    /// does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> ConvertResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConvertError::config(format!(
                    "{} not found",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sql2orm").join("config.toml"));
        }
        paths
    }

    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ConvertResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.targets()?;
        Ok(config)
    }

    /// Targets selected by [`Config::target`].
    pub fn targets(&self) -> ConvertResult<Vec<Target>> {
        parse_targets(&self.target)
    }
}

/// `all` or a single target name.
pub fn parse_targets(name: &str) -> ConvertResult<Vec<Target>> {
    if name.trim().eq_ignore_ascii_case("all") {
        return Ok(Target::ALL.to_vec());
    }
    Ok(vec![name.parse()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.targets().unwrap(), Target::ALL.to_vec());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("target = \"sequelize\"\ncolor = false").unwrap();
        assert_eq!(config.targets().unwrap(), vec![Target::Sequelize]);
        assert!(!config.color);
        assert_eq!(config.log, "warn");
    }

    #[test]
    fn test_invalid_files() {
        assert!(matches!(
            Config::parse("target = \"django\""),
            Err(ConvertError::UnknownTarget(_))
        ));
        assert!(matches!(Config::parse("colour = 1"), Err(ConvertError::Toml(_))));
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/sql2orm.toml"))).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
