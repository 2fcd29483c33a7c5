//! Error types for the reconciler crate.

use std::fmt;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The record is incomplete. Raised before any remote call.
    Validation { reason: String },
    /// A remote call failed (transport or API error).
    Api { method: String, message: String },
    /// Writing a report row failed.
    Report { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { reason } => write!(f, "{reason}"),
            Self::Api { message, .. } => write!(f, "{message}"),
            Self::Report { reason } => write!(f, "report error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create an API error.
    pub fn api(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(reason: impl Into<String>) -> Self {
        Self::Report {
            reason: reason.into(),
        }
    }

    /// Check if this is a validation error.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<hostsync_rpc::Error> for Error {
    fn from(err: hostsync_rpc::Error) -> Self {
        let method = err.method().unwrap_or("<config>").to_string();
        Self::api(method, err.to_string())
    }
}

impl From<hostsync_core::Error> for Error {
    fn from(err: hostsync_core::Error) -> Self {
        Self::report(err.to_string())
    }
}
