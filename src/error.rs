//! Error types for Recovery Pulse
//!
//! The engine core never fails on sparse or degenerate data; these errors
//! cover only the serialization boundary around it.

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse event log: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unsupported analysis kind: {0}")]
    UnsupportedAnalysis(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
