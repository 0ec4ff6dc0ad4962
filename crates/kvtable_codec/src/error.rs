//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value to JSON text.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode JSON text.
    #[error("decoding failed at line {line}, column {column}: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error from a parser error, keeping its position.
    pub fn decoding_failed(err: &serde_json::Error) -> Self {
        Self::DecodingFailed {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}
