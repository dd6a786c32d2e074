//! sitekit gateway: the identity platform's REST API behind
//! [`SettingsGateway`](sitekit_core::SettingsGateway).
//!
//! - [`client`]: [`GatewayClient`]: form POSTs, data-centre redirects, error mapping
//! - [`transport`]: the HTTP seam and its `ureq` implementation
//! - [`cache`]: process-lifetime cache for partner/site listings
//! - [`sanitize`]: response metadata and read-only schema attributes
//! - [`proxy`]: host whitelist and `/proxy/` addressing

pub mod cache;
pub mod client;
pub mod config;
pub mod proxy;
pub mod sanitize;
pub mod transport;

pub use client::{GatewayClient, WRONG_DATA_CENTER};
pub use config::{GatewayConfig, DEFAULT_API_DOMAIN, DEFAULT_TIMEOUT, PLATFORM_HOST_SUFFIX};
pub use transport::{Transport, TransportFailure, UreqTransport};
