//! Error types for the Pulsoft monitoring core.
//!
//! Every fallible collaborator call returns `PulsoftResult<T>`. The service
//! layer catches these and turns them into envelopes, so callers of the
//! service never see a `PulsoftError` directly.

use thiserror::Error;

/// The unified error type for the Pulsoft crates.
#[derive(Debug, Error)]
pub enum PulsoftError {
    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, timeout, body read failure).
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {status} for '{endpoint}'")]
    HttpStatus { status: u16, endpoint: String },

    /// The response body was not JSON, or did not decode into the expected shape.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// The backend answered 2xx but its body reported an error.
    #[error("backend rejected request to '{endpoint}': {reason}")]
    Rejected { endpoint: String, reason: String },

    /// No user is signed in, or the auth provider could not issue a token.
    #[error("not authenticated: {reason}")]
    Unauthenticated { reason: String },

    /// The real-time database rejected a read or write.
    #[error("database error: {reason}")]
    Database { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the Pulsoft crates.
pub type PulsoftResult<T> = Result<T, PulsoftError>;
