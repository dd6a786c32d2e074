//! The workflow engine.
//!
//! [`Engine::advance`] is called once per turn with the full state so far.
//! It walks the readiness checks in order and stops at the first gap,
//! returning a prompt for it. Once nothing is missing it performs the task's
//! remote calls and returns the terminal view. No state is kept between
//! turns.
//!
//! Readiness order:
//!
//! 1. credentials
//! 2. partner (auto-selected when exactly one is visible)
//! 3. task
//! 4. settings (one kind only for import, or validate against a file)
//! 5. task-specific sources and destinations

use std::thread;

use chrono::Utc;
use serde_json::Value;
use sitekit_core::{
    Credentials, PartnerSites, SettingDiff, SettingKind, SettingOps, SettingsGateway, Site, Task,
    View, WorkflowState,
};

use crate::error::EngineError;
use crate::files::SettingsFiles;
use crate::prompts;

pub const EXPORT_SUCCESSFUL: &str = "export successful";
pub const IMPORT_SUCCESSFUL: &str = "import successful";
pub const COPY_SUCCESSFUL: &str = "copy successful";

/// `{setting}.{apiKey}.{unixMillis}.json`
pub fn export_file_name(kind: SettingKind, api_key: &str, millis: i64) -> String {
    format!("{}.{}.{}.json", kind.token(), api_key, millis)
}

pub struct Engine<'a, G, F> {
    gateway: &'a G,
    files: &'a F,
}

impl<'a, G: SettingsGateway, F: SettingsFiles> Engine<'a, G, F> {
    pub fn new(gateway: &'a G, files: &'a F) -> Self {
        Self { gateway, files }
    }

    /// Produce the next view for `state`.
    pub fn advance(&self, state: &WorkflowState) -> Result<View, EngineError> {
        let Some(credentials) = state
            .credentials()
            .filter(|c| !c.user_key.is_empty() && !c.user_secret.is_empty())
        else {
            tracing::debug!("credentials missing");
            return Ok(prompts::credentials(state));
        };

        let partners = self.gateway.fetch_user_sites(&credentials, None)?;
        let partner_id = match (&state.partner_id, partners.as_slice()) {
            (Some(id), _) => id.clone(),
            (None, [only]) => {
                tracing::debug!(partner = %only.partner_id, "single partner auto-selected");
                only.partner_id.clone()
            }
            (None, _) => {
                tracing::debug!(count = partners.len(), "partner missing");
                return Ok(prompts::partner(&partners));
            }
        };
        let sites = self.partner_sites(&credentials, partners, &partner_id)?;

        let Some(task) = state.task else {
            return Ok(prompts::task());
        };

        let single = needs_single_setting(task, state);
        let kinds = match state.settings.as_deref() {
            Some(kinds) if !kinds.is_empty() && (!single || kinds.len() == 1) => kinds,
            _ => {
                tracing::debug!(%task, single, "settings missing");
                return Ok(prompts::settings(single));
            }
        };

        let run = Run {
            credentials: &credentials,
            state,
            kinds,
            sites: &sites,
        };
        match task {
            Task::Export => self.export(&run),
            Task::Import => self.import(&run),
            Task::Copy => self.copy(&run),
            Task::Validate => self.validate(&run),
        }
    }

    /// Sites for `partner_id`, from the unfiltered listing when it has them.
    fn partner_sites(
        &self,
        credentials: &Credentials,
        partners: Vec<PartnerSites>,
        partner_id: &str,
    ) -> Result<Vec<Site>, EngineError> {
        if let Some(partner) = partners.into_iter().find(|p| p.partner_id == partner_id) {
            return Ok(partner.sites);
        }
        tracing::debug!(partner = partner_id, "partner not in listing; fetching filtered");
        self.gateway
            .fetch_user_sites(credentials, Some(partner_id))?
            .into_iter()
            .next()
            .map(|partner| partner.sites)
            .ok_or_else(|| EngineError::PartnerNotFound(partner_id.to_string()))
    }

    fn export(&self, run: &Run<'_>) -> Result<View, EngineError> {
        let Some(source) = run.state.source_api_key.as_deref() else {
            return Ok(prompts::source_site(run.sites));
        };

        for &kind in run.kinds {
            let payload = (SettingOps::<G>::for_kind(kind).fetch)(self.gateway, run.credentials, source)?;
            let contents = serde_json::to_string_pretty(&payload).map_err(EngineError::Encode)?;
            let name = export_file_name(kind, source, Utc::now().timestamp_millis());
            self.files.write(&name, &contents)?;
            tracing::info!(setting = %kind, api_key = source, file = %name, "exported");
        }
        Ok(View::info(EXPORT_SUCCESSFUL))
    }

    fn import(&self, run: &Run<'_>) -> Result<View, EngineError> {
        let Some(file) = run.state.source_file.as_deref() else {
            return Ok(prompts::source_file(self.files.list()?));
        };
        let Some(destination) = run.state.destination_api_key.as_deref() else {
            return Ok(prompts::destination_site(run.sites));
        };

        // Settings readiness guarantees exactly one kind here.
        for &kind in run.kinds {
            let payload = self.read_json(file)?;
            (SettingOps::<G>::for_kind(kind).update)(self.gateway, run.credentials, destination, &payload)?;
            tracing::info!(setting = %kind, api_key = destination, "imported");
        }
        Ok(View::info(IMPORT_SUCCESSFUL))
    }

    /// Fetch from source, update destination, kind by kind. A failure
    /// part-way leaves earlier kinds applied.
    fn copy(&self, run: &Run<'_>) -> Result<View, EngineError> {
        let Some(source) = run.state.source_api_key.as_deref() else {
            return Ok(prompts::source_site(run.sites));
        };
        let Some(destination) = run.state.destination_api_key.as_deref() else {
            return Ok(prompts::destination_site(run.sites));
        };

        for &kind in run.kinds {
            let ops = SettingOps::<G>::for_kind(kind);
            let payload = (ops.fetch)(self.gateway, run.credentials, source)?;
            (ops.update)(self.gateway, run.credentials, destination, &payload)?;
            tracing::info!(setting = %kind, from = source, to = destination, "copied");
        }
        Ok(View::info(COPY_SUCCESSFUL))
    }

    fn validate(&self, run: &Run<'_>) -> Result<View, EngineError> {
        let source = match (
            run.state.source_api_key.as_deref(),
            run.state.source_file.as_deref(),
        ) {
            (Some(api_key), _) => Source::Site(api_key),
            (None, Some(file)) => Source::File(file),
            (None, None) => return Ok(prompts::source_site(run.sites)),
        };
        let Some(destination) = run.state.destination_api_key.as_deref() else {
            return Ok(prompts::destination_site(run.sites));
        };

        let mut diffs = Vec::with_capacity(run.kinds.len());
        for &kind in run.kinds {
            let (source_value, destination_value) = match source {
                Source::Site(api_key) => self.fetch_pair(run.credentials, kind, api_key, destination)?,
                Source::File(file) => {
                    let source_value = self.read_json(file)?;
                    let fetch = SettingOps::<G>::for_kind(kind).fetch;
                    (source_value, fetch(self.gateway, run.credentials, destination)?)
                }
            };
            let diff: SettingDiff = sitekit_diff::compare(kind, source_value, destination_value);
            tracing::info!(
                setting = %kind,
                added = diff.counts.added,
                removed = diff.counts.removed,
                changed = diff.counts.changed,
                "validated"
            );
            diffs.push(diff);
        }
        Ok(View::ValidateResult { diffs })
    }

    /// Fetch one kind from both sites at once.
    fn fetch_pair(
        &self,
        credentials: &Credentials,
        kind: SettingKind,
        source: &str,
        destination: &str,
    ) -> Result<(Value, Value), EngineError> {
        let fetch = SettingOps::<G>::for_kind(kind).fetch;
        let gateway = self.gateway;
        let (source_value, destination_value) = thread::scope(|scope| {
            let source_handle = scope.spawn(move || fetch(gateway, credentials, source));
            let destination_value = fetch(gateway, credentials, destination);
            let source_value = source_handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (source_value, destination_value)
        });
        Ok((source_value?, destination_value?))
    }

    fn read_json(&self, file: &str) -> Result<Value, EngineError> {
        let text = self.files.read(file)?;
        serde_json::from_str(&text).map_err(|source| EngineError::Parse {
            file: describe_source(file),
            source,
        })
    }
}

/// Everything a task handler needs once the common checks have passed.
struct Run<'r> {
    credentials: &'r Credentials,
    state: &'r WorkflowState,
    kinds: &'r [SettingKind],
    sites: &'r [Site],
}

#[derive(Clone, Copy)]
enum Source<'s> {
    Site(&'s str),
    File(&'s str),
}

/// Import reads one file into one kind; validating against a file likewise.
fn needs_single_setting(task: Task, state: &WorkflowState) -> bool {
    match task {
        Task::Import => true,
        Task::Validate => state.source_api_key.is_none() && state.source_file.is_some(),
        Task::Export | Task::Copy => false,
    }
}

/// File name for error messages; data URIs are not echoed in full.
fn describe_source(file: &str) -> String {
    if file.starts_with("data:") {
        "<data URI>".to_string()
    } else {
        file.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_name_format() {
        assert_eq!(
            export_file_name(SettingKind::Screensets, "3_abc", 1_700_000_000_123),
            "screensets.3_abc.1700000000123.json"
        );
    }

    #[test]
    fn single_setting_rules() {
        let mut state = WorkflowState::default();
        assert!(needs_single_setting(Task::Import, &state));
        assert!(!needs_single_setting(Task::Validate, &state));

        state.source_file = Some("schema.json".into());
        assert!(needs_single_setting(Task::Validate, &state));

        state.source_api_key = Some("3_src".into());
        assert!(!needs_single_setting(Task::Validate, &state));
        assert!(!needs_single_setting(Task::Copy, &state));
    }

    #[test]
    fn data_uri_sources_are_not_echoed() {
        assert_eq!(describe_source("data:;base64,e30="), "<data URI>");
        assert_eq!(describe_source("schema.json"), "schema.json");
    }
}
