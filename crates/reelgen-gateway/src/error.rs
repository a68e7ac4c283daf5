//! Gateway error types.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors from a single remote call, tagged with the operation that failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway configuration: {0}")]
    ConfigError(String),

    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{operation} returned an invalid payload: {detail}")]
    InvalidPayload {
        operation: &'static str,
        detail: String,
    },
}

impl GatewayError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    pub fn status(operation: &'static str, status: reqwest::StatusCode) -> Self {
        Self::Status { operation, status }
    }

    pub fn invalid_payload(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidPayload {
            operation,
            detail: detail.into(),
        }
    }

    /// The remote operation this error came from, if any.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            GatewayError::ConfigError(_) => None,
            GatewayError::Transport { operation, .. }
            | GatewayError::Status { operation, .. }
            | GatewayError::InvalidPayload { operation, .. } => Some(operation),
        }
    }
}
