//! Error types and handling for arrange operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for arrange operations
#[derive(Debug, Error)]
pub enum ArrangeError {
    /// Source could not be parsed into a usable tree
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Rule execution errors
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Capture and rewrite disagreed on the tracked members of a type
    #[error(
        "Invariant violation in type '{type_name}': captured {expected} members but visited {visited} member positions"
    )]
    InvariantViolation {
        type_name: String,
        expected: usize,
        visited: usize,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Config,
    Rule,
    Io,
    Invariant,
    Internal,
}

impl ArrangeError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArrangeError::ParseError { .. } => ErrorKind::Parse,
            ArrangeError::ConfigError { .. } => ErrorKind::Config,
            ArrangeError::RuleError { .. } => ErrorKind::Rule,
            ArrangeError::IoError { .. } => ErrorKind::Io,
            ArrangeError::InvariantViolation { .. } => ErrorKind::Invariant,
            ArrangeError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    ///
    /// Invariant violations abort the document they occur in; the caller may
    /// still move on to other documents, but never treats them as a soft skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Rule | ErrorKind::Io)
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn invariant_violation(type_name: impl Into<String>, expected: usize, visited: usize) -> Self {
        Self::InvariantViolation {
            type_name: type_name.into(),
            expected,
            visited,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for ArrangeError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
