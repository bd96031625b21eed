//! Error types for sql2orm.
//!
//! Conversion itself is best-effort and never fails; these errors cover the
//! strict parsing entry point, target selection, configuration and I/O.

use thiserror::Error;

/// The main error type for sql2orm operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The statement has no recognizable type or table.
    #[error("Could not parse SQL statement: '{0}'")]
    Unparsable(String),

    /// Unknown output target name.
    #[error("Unknown target: '{0}'. Expected: activerecord or sequelize")]
    UnknownTarget(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file.
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Create an unparsable-statement error, keeping a short excerpt of the input.
    pub fn unparsable(sql: &str) -> Self {
        let excerpt: String = sql.trim().chars().take(60).collect();
        Self::Unparsable(excerpt)
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for sql2orm operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
