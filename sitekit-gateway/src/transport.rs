//! HTTP transport seam.
//!
//! [`GatewayClient`](crate::GatewayClient) only needs "POST this form, give me
//! the body text". Tests swap in a scripted transport; production uses
//! [`UreqTransport`].

use std::time::Duration;

use thiserror::Error;

/// Network-level failure: connection, timeout, unreadable body.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

pub trait Transport: Send + Sync {
    /// POST `form` as `application/x-www-form-urlencoded` and return the body.
    ///
    /// Non-2xx responses still return their body; the platform reports
    /// failures inside the JSON payload.
    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, TransportFailure>;
}

/// Blocking transport over a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, TransportFailure> {
        let pairs: Vec<(&str, &str)> = form
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        let response = match self.agent.post(url).send_form(&pairs) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                tracing::debug!(code, "platform answered with HTTP error status");
                response
            }
            Err(ureq::Error::Transport(err)) => return Err(TransportFailure(err.to_string())),
        };

        response
            .into_string()
            .map_err(|e| TransportFailure(format!("failed to read response body: {e}")))
    }
}
