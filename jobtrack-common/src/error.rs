//! Common error types for the job tracker

use thiserror::Error;

/// Common result type for job tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the job tracker crates
#[derive(Error, Debug)]
pub enum Error {
    /// A registered source could not be retrieved (network error or non-success status)
    #[error("Failed to fetch source '{source_name}': {message}")]
    SourceFetch {
        source_name: String,
        message: String,
    },

    /// A registered source returned a payload that is not a record list
    #[error("Failed to parse source '{source_name}': {message}")]
    SourceParse {
        source_name: String,
        message: String,
    },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Build a fetch error for the named source
    pub fn fetch(source_name: impl Into<String>, message: impl ToString) -> Self {
        Error::SourceFetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Build a parse error for the named source
    pub fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Error::SourceParse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Name of the source that failed, if the error belongs to a fetch cycle
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Error::SourceFetch { source_name, .. } | Error::SourceParse { source_name, .. } => {
                Some(source_name)
            }
            _ => None,
        }
    }
}
