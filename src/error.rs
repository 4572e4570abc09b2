//! Error types for a3s-redact

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while configuring or running the redaction pipeline
#[derive(Debug, Error)]
pub enum RedactError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential could not be resolved at startup
    #[error("Missing credential '{0}'")]
    MissingCredential(String),

    /// Detector call failure that was not absorbed by the classifier
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    /// IO failure (report persistence, config loading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single call to an entity detector
///
/// Recoverable: the classifier logs it and treats the pass as having
/// produced zero spans.
#[derive(Debug, Clone, Error)]
pub enum DetectorError {
    /// Connection, DNS or TLS failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credentials rejected by the service
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-success HTTP status
    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service accepted the request but reported a document error
    #[error("Service error {code}: {message}")]
    Service { code: String, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Call exceeded the configured detector timeout
    #[error("Detector call timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for redaction operations
pub type Result<T> = std::result::Result<T, RedactError>;
