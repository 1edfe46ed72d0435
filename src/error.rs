//! Error types and handling for myenovos
//!
//! This module defines the error types used throughout the crate. The three
//! portal failure classes (authentication, upstream, not found) stay
//! distinguishable so the binary can map them to distinct exit codes.

use thiserror::Error;

/// Result type alias for myenovos operations
pub type Result<T> = std::result::Result<T, EnovosError>;

/// Main error type for myenovos
#[derive(Debug, Error)]
pub enum EnovosError {
    /// Credentials rejected or the token artifact is missing/malformed
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Non-2xx or unparsable response from a portal (or sink) endpoint
    #[error("Upstream error ({endpoint}): {message}")]
    Upstream { endpoint: String, message: String },

    /// A requested customer or contract does not exist
    #[error("Not found: {what} - {message}")]
    NotFound { what: String, message: String },

    /// Transport-level failures (DNS, TLS, connection reset, ...)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl EnovosError {
    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        EnovosError::Authentication {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the given endpoint
    pub fn upstream<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        EnovosError::Upstream {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<W: Into<String>, S: Into<String>>(what: W, message: S) -> Self {
        EnovosError::NotFound {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        EnovosError::Network {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        EnovosError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        EnovosError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        EnovosError::Io {
            message: message.into(),
        }
    }

    /// Process exit code for this error class
    pub fn exit_code(&self) -> u8 {
        match self {
            EnovosError::Authentication { .. } => 2,
            EnovosError::NotFound { .. } => 3,
            EnovosError::Upstream { .. } => 4,
            EnovosError::Network { .. } => 5,
            EnovosError::Config { .. }
            | EnovosError::Validation { .. }
            | EnovosError::Serialization { .. }
            | EnovosError::Io { .. } => 1,
        }
    }
}

impl From<std::io::Error> for EnovosError {
    fn from(err: std::io::Error) -> Self {
        EnovosError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for EnovosError {
    fn from(err: serde_yaml::Error) -> Self {
        EnovosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EnovosError {
    fn from(err: serde_json::Error) -> Self {
        EnovosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for EnovosError {
    fn from(err: reqwest::Error) -> Self {
        EnovosError::network(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for EnovosError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        EnovosError::validation("header", err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for EnovosError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        EnovosError::validation("header", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = EnovosError::auth("no token");
        assert!(matches!(err, EnovosError::Authentication { .. }));

        let err = EnovosError::upstream("contracts", "HTTP 500");
        assert!(matches!(err, EnovosError::Upstream { .. }));

        let err = EnovosError::validation("field", "test validation error");
        assert!(matches!(err, EnovosError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = EnovosError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = EnovosError::upstream("userinfo", "HTTP 502");
        assert_eq!(format!("{}", err), "Upstream error (userinfo): HTTP 502");

        let err = EnovosError::not_found("contract", "no contract 42");
        assert_eq!(format!("{}", err), "Not found: contract - no contract 42");
    }

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let codes = [
            EnovosError::auth("x").exit_code(),
            EnovosError::not_found("x", "y").exit_code(),
            EnovosError::upstream("x", "y").exit_code(),
            EnovosError::network("x").exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(EnovosError::config("x").exit_code(), 1);
    }
}
