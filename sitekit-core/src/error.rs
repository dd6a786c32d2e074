//! Error types for sitekit-core.

use thiserror::Error;

/// Failures reported by a [`SettingsGateway`](crate::gateway::SettingsGateway).
///
/// Missing operator input is never one of these; it is modelled as a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The platform answered with a non-zero error code.
    #[error("{detail}")]
    Remote { code: i64, detail: String },

    /// Network failure, timeout, or a response that is not valid JSON.
    #[error("transport failure calling {method}: {message}")]
    Transport { method: String, message: String },

    /// Rejected before any request was sent (e.g. a non-whitelisted target).
    #[error("invalid request: {0}")]
    ValidationInput(String),
}

impl GatewayError {
    /// Whether the operator should see a generic "unrecoverable" message
    /// rather than the error text itself.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, GatewayError::Transport { .. })
    }
}

/// A flag or answer that does not name a known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown {what} '{value}'; expected: {expected}")]
    UnknownValue {
        what: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Failure decoding a resume token.
#[derive(Debug, Error)]
pub enum StateTokenError {
    #[error("state token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("state token does not hold a workflow state: {0}")]
    Json(#[from] serde_json::Error),
}
