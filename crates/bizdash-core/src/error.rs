//! Error types for bizdash.
//!
//! One unified error type with explicit variants for transport,
//! authentication, protocol, storage and input validation failures.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for bizdash operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (refresh failed, no session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the backend.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credential storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status of a backend response, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(err) => Some(err.status),
            Error::Auth(AuthError::RefreshRejected(err)) => Some(err.status),
            _ => None,
        }
    }

    /// True when the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Protocol(err) if err.is_unauthorized())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
///
/// These are cloneable because a single refresh outcome is handed to every
/// caller that waited on it.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No refresh token was stored when a refresh was needed.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status.
    #[error("token refresh rejected: {0}")]
    RefreshRejected(ProtocolError),

    /// The refresh call failed before a usable answer arrived.
    #[error("token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// The refresh call did not settle in time.
    #[error("token refresh timed out after {duration_ms}ms")]
    RefreshTimeout { duration_ms: u64 },
}

/// A non-success response from the backend.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (DRF `code`, or `error`).
    pub code: Option<String>,
    /// Human-readable message (DRF `detail`, or `message`).
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// A success response whose body could not be decoded.
    pub fn invalid_body(status: u16, reason: impl fmt::Display) -> Self {
        Self::new(
            status,
            Some("invalid_body".to_string()),
            Some(reason.to_string()),
        )
    }

    /// Check if the backend rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The stored session could not be parsed.
    #[error("corrupt session data in {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Token contains characters that cannot go in a header.
    #[error("token is not a valid header value")]
    TokenEncoding,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display_includes_code_and_message() {
        let err = ProtocolError::new(
            401,
            Some("token_not_valid".to_string()),
            Some("Given token not valid for any token type".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "HTTP 401 [token_not_valid]: Given token not valid for any token type"
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn status_is_exposed_for_rejected_refresh() {
        let err = Error::Auth(AuthError::RefreshRejected(ProtocolError::new(400, None, None)));
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_only_for_protocol_401() {
        let err = Error::Protocol(ProtocolError::new(401, None, None));
        assert!(err.is_unauthorized());

        let err = Error::Transport(TransportError::Connection {
            message: "refused".to_string(),
        });
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), None);
    }
}
