//! URL-safe encoding of a [`WorkflowState`].
//!
//! The browser front-end carries the whole state in a route parameter and the
//! CLI prints the same token so a run can be resumed with `--state`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::StateTokenError;
use crate::types::WorkflowState;

/// base64url (unpadded) of the state's JSON.
pub fn encode(state: &WorkflowState) -> Result<String, StateTokenError> {
    let json = serde_json::to_vec(state)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(token: &str) -> Result<WorkflowState, StateTokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim().trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}
