//! Error types for the SaneQL compiler

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A compilation failure. The first error aborts the whole compilation;
/// there is no partial recovery.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Lexical and syntactic errors
    #[error("syntax error: {0}")]
    Syntax(String),

    // Name resolution errors
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("'{0}' is ambiguous")]
    Ambiguous(String),

    #[error("function '{0}' not found")]
    FunctionNotFound(String),

    // Type and argument errors carry their full context in the message
    #[error("{0}")]
    Analyze(String),

    // Constructs the language reserves but does not support yet
    #[error("{0} not implemented yet")]
    NotImplemented(&'static str),
}

impl Error {
    /// Build a contextual analysis error
    pub fn analyze(message: impl Into<String>) -> Self {
        Error::Analyze(message.into())
    }
}
