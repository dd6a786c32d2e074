//! sitekit core library: workflow data model, answer merging, the gateway
//! boundary and its errors.
//!
//! - [`types`]: state, questions, views, diff report structs
//! - [`answers`]: folding prompt answers into a new state
//! - [`gateway`]: [`SettingsGateway`] and the per-kind [`SettingOps`] table
//! - [`state_token`]: URL-safe state encoding
//! - [`error`]: [`GatewayError`] and friends

pub mod answers;
pub mod error;
pub mod gateway;
pub mod state_token;
pub mod types;

pub use answers::{Answer, Answers};
pub use error::{GatewayError, ParseError, StateTokenError};
pub use gateway::{SettingOps, SettingsGateway};
pub use types::{
    Choice, Credentials, DiffCounts, DiffKind, DiffPart, Field, PartnerSites, Question,
    QuestionKind, SettingDiff, SettingKind, Site, Task, View, WorkflowState,
};
