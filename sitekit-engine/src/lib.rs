//! sitekit engine: the resumable workflow behind every front-end.
//!
//! - [`engine`]: [`Engine::advance`]: state in, next view out
//! - [`prompts`]: question builders for each readiness gap
//! - [`files`]: [`SettingsFiles`] and the on-disk [`WorkDir`]
//! - [`error`]: [`EngineError`], [`FileError`]

pub mod engine;
pub mod error;
pub mod files;
pub mod prompts;

pub use engine::{export_file_name, Engine, COPY_SUCCESSFUL, EXPORT_SUCCESSFUL, IMPORT_SUCCESSFUL};
pub use error::{EngineError, FileError};
pub use files::{SettingsFiles, WorkDir};
