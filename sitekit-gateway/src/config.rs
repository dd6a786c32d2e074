//! Gateway configuration.

use std::time::Duration;

/// Data centre used until the platform redirects us elsewhere.
pub const DEFAULT_API_DOMAIN: &str = "us1.gigya.com";

/// Every request target must live under this host suffix.
pub const PLATFORM_HOST_SUFFIX: &str = ".gigya.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the gateway talks to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Regional API domain, e.g. `eu1.gigya.com`.
    pub api_domain: String,
    /// Host suffix every target (including redirect domains) must carry.
    pub allowed_host_suffix: String,
    /// Route requests through `{proxy_base}/proxy/{target}` when set.
    pub proxy_base: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_domain: DEFAULT_API_DOMAIN.to_string(),
            allowed_host_suffix: PLATFORM_HOST_SUFFIX.to_string(),
            proxy_base: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
