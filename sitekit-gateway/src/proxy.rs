//! Request-target whitelist and reverse-proxy addressing.
//!
//! Browsers cannot post cross-origin to the platform, so requests can be
//! routed through `{base}/proxy/{target}` where `target` is percent-encoded
//! twice (once for the URL, once more so intermediaries do not unescape it).
//! Every target, proxied or not, must be an https URL on the platform.

use sitekit_core::GatewayError;
use url::Url;

/// Parse `target` and require `https` and a host ending in `allowed_suffix`.
pub fn check_target(target: &str, allowed_suffix: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(target)
        .map_err(|e| GatewayError::ValidationInput(format!("'{target}' is not a valid URL: {e}")))?;
    let host = url.host_str().unwrap_or_default();
    if url.scheme() != "https" || !host.ends_with(allowed_suffix) {
        return Err(GatewayError::ValidationInput(format!(
            "URL not whitelisted: {target}"
        )));
    }
    Ok(url)
}

/// Address of `target` behind the proxy at `base`.
pub fn proxied_url(base: &str, target: &Url) -> String {
    let once = urlencoding::encode(target.as_str());
    let twice = urlencoding::encode(&once);
    format!("{}/proxy/{}", base.trim_end_matches('/'), twice)
}
