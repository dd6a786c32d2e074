//! Command-line flags and what they turn into.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sitekit_core::{state_token, ParseError, SettingKind, Task, WorkflowState};
use sitekit_engine::WorkDir;
use sitekit_gateway::{GatewayConfig, DEFAULT_API_DOMAIN, PLATFORM_HOST_SUFFIX};

#[derive(Parser, Debug)]
#[command(
    name = "sitekit",
    version,
    about = "Export, import, copy and validate identity platform site settings",
    long_about = "Anything not given as a flag is asked for interactively.",
)]
pub struct Cli {
    /// Platform user key.
    #[arg(long = "userKey", value_name = "KEY")]
    pub user_key: Option<String>,

    /// Platform user secret.
    #[arg(long = "userSecret", value_name = "SECRET")]
    pub user_secret: Option<String>,

    /// export, import, copy or validate.
    #[arg(long)]
    pub task: Option<Task>,

    /// Comma-separated: schema, screensets, policies.
    #[arg(long, value_name = "LIST")]
    pub settings: Option<SettingsArg>,

    /// Partner ID owning the sites.
    #[arg(long = "partnerId", value_name = "ID")]
    pub partner_id: Option<String>,

    /// API key of the site to read from.
    #[arg(long = "sourceApiKey", value_name = "API_KEY")]
    pub source_api_key: Option<String>,

    /// Settings file to import, or to validate against.
    #[arg(long = "sourceFile", value_name = "FILE")]
    pub source_file: Option<String>,

    /// Comma-separated API keys to write to; each gets its own run.
    #[arg(long = "destinationApiKeys", value_name = "LIST", value_delimiter = ',')]
    pub destination_api_keys: Vec<String>,

    /// Data centre to call first.
    #[arg(long = "apiDomain", value_name = "DOMAIN", default_value = DEFAULT_API_DOMAIN)]
    pub api_domain: String,

    /// Route requests through `<URL>/proxy/`.
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Directory for exported and imported files (default: current dir).
    #[arg(long = "workDir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Debug logging on stderr.
    #[arg(long, short)]
    pub verbose: bool,

    /// Resume from a token printed by an earlier run.
    #[arg(long, value_name = "TOKEN")]
    pub state: Option<String>,
}

/// Thin wrapper so clap parses a comma-separated kind list as one value.
#[derive(Debug, Clone)]
pub struct SettingsArg(pub Vec<SettingKind>);

impl FromStr for SettingsArg {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SettingKind::parse_list(s).map(Self)
    }
}

impl fmt::Display for SettingsArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<_> = self.0.iter().map(|k| k.token()).collect();
        f.write_str(&tokens.join(","))
    }
}

impl Cli {
    /// The resume token's state, if any, overlaid with explicit flags.
    pub fn initial_state(&self) -> Result<WorkflowState> {
        let mut state = match &self.state {
            Some(token) => state_token::decode(token).context("invalid --state token")?,
            None => WorkflowState::default(),
        };
        state.finished = false;

        overlay(&mut state.user_key, &self.user_key);
        overlay(&mut state.user_secret, &self.user_secret);
        overlay(&mut state.partner_id, &self.partner_id);
        overlay(&mut state.source_api_key, &self.source_api_key);
        overlay(&mut state.source_file, &self.source_file);
        overlay(&mut state.destination_api_key, &self.destination_api_keys.first().cloned());
        if let Some(task) = self.task {
            state.task = Some(task);
        }
        if let Some(SettingsArg(kinds)) = &self.settings {
            state.settings = Some(kinds.clone()).filter(|k| !k.is_empty());
        }
        Ok(state)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            api_domain: self.api_domain.clone(),
            allowed_host_suffix: PLATFORM_HOST_SUFFIX.to_string(),
            proxy_base: self.proxy.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    pub fn work_dir(&self) -> Result<WorkDir> {
        match &self.work_dir {
            Some(dir) => Ok(WorkDir::new(dir)),
            None => WorkDir::current().context("could not determine working directory"),
        }
    }
}

fn overlay(field: &mut Option<String>, flag: &Option<String>) {
    if let Some(value) = flag.as_ref().filter(|v| !v.trim().is_empty()) {
        *field = Some(value.clone());
    }
}
