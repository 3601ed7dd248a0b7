//! Error types for conversion operations
//!
//! The public conversion entry points never fail: every error below is
//! absorbed inside the pipeline and degrades to plain-text handling. The
//! variants exist for the fallible building blocks (parsing, byte decoding)
//! and for the command line front end.

use thiserror::Error;

/// Errors that can occur while preparing clipboard content for conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    /// HTML parsing failed
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Get numeric error code, used as the process exit status by `clip2md`
    pub fn code(&self) -> u8 {
        match self {
            ConversionError::ParseError(_) => 1,
            ConversionError::EncodingError(_) => 2,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::Io(_) => 74,
        }
    }
}
