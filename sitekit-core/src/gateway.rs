//! The remote settings boundary.
//!
//! [`SettingsGateway`] is implemented by the HTTP client in `sitekit-gateway`
//! and by in-memory fakes in tests. [`SettingOps`] maps each [`SettingKind`]
//! to its fetch/update pair; a new kind is added by extending that table.

use serde_json::Value;

use crate::error::GatewayError;
use crate::types::{Credentials, PartnerSites, SettingKind};

/// Named remote operations on the identity platform.
///
/// Implementations are shared across scoped threads within one workflow
/// turn, hence `Sync`.
pub trait SettingsGateway: Sync {
    /// Partners (and their sites) visible to these credentials, optionally
    /// narrowed to one partner.
    fn fetch_user_sites(
        &self,
        credentials: &Credentials,
        partner_id: Option<&str>,
    ) -> Result<Vec<PartnerSites>, GatewayError>;

    fn fetch_schema(&self, credentials: &Credentials, api_key: &str) -> Result<Value, GatewayError>;

    fn fetch_policies(&self, credentials: &Credentials, api_key: &str)
        -> Result<Value, GatewayError>;

    fn fetch_screensets(
        &self,
        credentials: &Credentials,
        api_key: &str,
    ) -> Result<Value, GatewayError>;

    fn update_schema(
        &self,
        credentials: &Credentials,
        api_key: &str,
        schema: &Value,
    ) -> Result<(), GatewayError>;

    fn update_policies(
        &self,
        credentials: &Credentials,
        api_key: &str,
        policies: &Value,
    ) -> Result<(), GatewayError>;

    fn update_screensets(
        &self,
        credentials: &Credentials,
        api_key: &str,
        screensets: &Value,
    ) -> Result<(), GatewayError>;
}

/// Reads one setting kind from a site.
pub type FetchFn<G> = fn(&G, &Credentials, &str) -> Result<Value, GatewayError>;

/// Writes one setting kind to a site.
pub type UpdateFn<G> = fn(&G, &Credentials, &str, &Value) -> Result<(), GatewayError>;

/// The fetch/update pair for one setting kind.
pub struct SettingOps<G> {
    pub fetch: FetchFn<G>,
    pub update: UpdateFn<G>,
}

impl<G> Clone for SettingOps<G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for SettingOps<G> {}

impl<G: SettingsGateway> SettingOps<G> {
    pub fn for_kind(kind: SettingKind) -> Self {
        match kind {
            SettingKind::Schema => SettingOps {
                fetch: G::fetch_schema,
                update: G::update_schema,
            },
            SettingKind::Screensets => SettingOps {
                fetch: G::fetch_screensets,
                update: G::update_screensets,
            },
            SettingKind::Policies => SettingOps {
                fetch: G::fetch_policies,
                update: G::update_policies,
            },
        }
    }
}
