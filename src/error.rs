//! Error types for QueryGPT
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for QueryGPT operations
///
/// Covers configuration loading, credential lookup, and every way a call
/// to the Q&A backend can fail. Callers that need to react to a specific
/// failure (for example a 403 on the history endpoint) recover the variant
/// with `anyhow::Error::downcast_ref`.
#[derive(Error, Debug)]
pub enum QueryGptError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No bearer token is available for an authenticated call
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Backend rejected the bearer token (HTTP 401)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Backend refused access to the resource (HTTP 403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Any other non-2xx response from the backend
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// Status code returned by the backend
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The backend answered with a body the client cannot interpret
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend could not be reached at all
    #[error("Connection error: {0}")]
    Transport(#[source] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl QueryGptError {
    /// Build the error for a non-2xx response, mapping 401 and 403 onto
    /// their dedicated variants.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Authentication(message),
            403 => Self::Forbidden(message),
            _ => Self::HttpStatus { status, message },
        }
    }

    /// True when the backend could not be reached, as opposed to answering
    /// with an error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias for QueryGPT operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to downcast to [`QueryGptError`].
pub type Result<T> = anyhow::Result<T>;

/// Returns true when `err` wraps a transport-level [`QueryGptError`].
pub fn is_transport_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<QueryGptError>()
        .map(QueryGptError::is_transport)
        .unwrap_or(false)
}
