use thiserror::Error;

/// Classifies configuration errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A required text pattern was empty or whitespace only
    BlankText,
    /// A copyright year was not numeric
    InvalidDate,
    /// A copyright end year was given without a start year
    MissingStartDate,
    /// An SPDX identifier was blank or contained illegal characters
    InvalidSpdxId,
    /// A regex or glob pattern could not be compiled
    InvalidPattern,
    /// A license referenced a family that was never declared
    UnknownFamily,
    /// Two licenses were declared with the same id
    DuplicateLicense,
    /// A numeric or structural setting was out of range
    InvalidSetting,
}

/// Rat engine error types
#[derive(Error, Debug)]
pub enum RatError {
    #[error("Configuration error: {message}")]
    Configuration {
        kind: ConfigErrorKind,
        message: String,
    },

    #[error("Parse error in {file} at line {line}: {message}")]
    ParseErrorAtLine {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Invalid document name: {0}")]
    InvalidDocumentName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Glob error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RatError {
    /// Build a configuration error of the given kind.
    pub fn config(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        RatError::Configuration {
            kind,
            message: message.into(),
        }
    }

    /// The configuration error kind, if this is a configuration error.
    pub fn config_kind(&self) -> Option<ConfigErrorKind> {
        match self {
            RatError::Configuration { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RatError>;
