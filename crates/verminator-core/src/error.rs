//! Error types for the Verminator core library
//!
//! Every fatal condition of a load or validation run is one variant of
//! [`Error`]. Warnings are not errors; see [`crate::validator::ValidationWarning`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Verminator operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed version string
    #[error("Parse error: cannot parse '{input}' as a version: {message}")]
    Parse { input: String, message: String },

    /// `min > max` in a declared range, prefix mismatch or mixed precision
    #[error("Range error: {context} - {message}")]
    Range { context: String, message: String },

    /// The same key declared twice where it must be unique
    #[error("Duplicate {what} '{name}' in {context}")]
    Duplicate {
        what: String,
        name: String,
        context: String,
    },

    /// A semantic rule of an instance or matrix was violated
    #[error("Validation error: {context} - {message}")]
    Validation { context: String, message: String },

    /// A version or release that must exist was not found
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// IO errors while reading or writing documents
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing or emission errors
    #[error("YAML error in '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Range,
    Duplicate,
    Validation,
    NotFound,
    Io,
    Yaml,
}

impl Error {
    /// Create a parse error for `input`
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a range error
    pub fn range(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Range {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate-declaration error
    pub fn duplicate(
        what: impl Into<String>,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            what: what.into(),
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a validation error
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a YAML error with path context
    pub fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Range { .. } => ErrorKind::Range,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::Yaml { .. } => ErrorKind::Yaml,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Range => write!(f, "range"),
            ErrorKind::Duplicate => write!(f, "duplicate"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Yaml => write!(f, "yaml"),
        }
    }
}
