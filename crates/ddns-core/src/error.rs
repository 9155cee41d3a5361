//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause carried by [`Error::Network`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// An outbound request could not be completed (no usable HTTP response)
    #[error("Network error: {message}")]
    Network {
        /// What we were trying to do
        message: String,
        /// Lower-level failure, if one was reported
        #[source]
        source: Option<BoxError>,
    },

    /// The address-echo service answered with something that is not an IPv4 literal
    #[error("Invalid address from echo service: {0:?}")]
    InvalidAddress(String),

    /// The DNS provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Provider {
        /// Raw HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error without an underlying cause
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a network error wrapping a lower-level failure
    pub fn network_with(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a provider error from a raw status and body
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }

    /// Whether this error was raised before any network call was made
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
