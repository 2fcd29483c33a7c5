//! Error types for the JSON-RPC client.

use thiserror::Error;

/// Result type for RPC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the monitoring API.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP round trip failed (connection refused, bad status, ...).
    #[error("HTTP failure calling {method}: {reason}")]
    Transport { method: String, reason: String },

    /// The request did not complete within the configured timeout.
    #[error("HTTP failure calling {method}: request timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    /// The API answered with an explicit error object.
    #[error("API error in {method}: {message} | {data}")]
    Remote {
        method: String,
        code: i64,
        message: String,
        data: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("invalid response from {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    /// The request parameters could not be encoded.
    #[error("invalid request for {method}: {reason}")]
    InvalidRequest { method: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl Error {
    /// Create a transport error.
    pub fn transport(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(method: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            method: method.into(),
            timeout_ms,
        }
    }

    /// Create a remote (API-reported) error.
    pub fn remote(
        method: impl Into<String>,
        code: i64,
        message: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self::Remote {
            method: method.into(),
            code,
            message: message.into(),
            data: data.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// RPC method the error belongs to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Transport { method, .. }
            | Self::Timeout { method, .. }
            | Self::Remote { method, .. }
            | Self::InvalidResponse { method, .. }
            | Self::InvalidRequest { method, .. } => Some(method),
            Self::ConfigError { .. } => None,
        }
    }

    /// Check if the failure happened below the API (network, status, decoding).
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::InvalidResponse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = Error::remote("hostgroup.create", -32602, "Invalid params.", "already exists");
        assert_eq!(
            err.to_string(),
            "API error in hostgroup.create: Invalid params. | already exists"
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_error_carries_method() {
        let err = Error::transport("host.get", "connection refused");
        assert_eq!(err.method(), Some("host.get"));
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_config_error_has_no_method() {
        let err = Error::config_error("bad url");
        assert_eq!(err.method(), None);
    }
}
