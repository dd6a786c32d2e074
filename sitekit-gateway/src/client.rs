//! HTTP implementation of [`SettingsGateway`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sitekit_core::{Credentials, GatewayError, PartnerSites, SettingsGateway};

use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::proxy;
use crate::sanitize;
use crate::transport::{Transport, UreqTransport};

/// Platform error code for "this site lives in another data centre".
pub const WRONG_DATA_CENTER: i64 = 301_001;

/// Talks to the identity platform's REST API.
///
/// Every call is a form POST to `https://{namespace}.{apiDomain}/{method}`
/// with `userKey` and `secret` added to the parameters. `admin.getUserSites`
/// responses are cached for the lifetime of the client.
pub struct GatewayClient<T: Transport = UreqTransport> {
    config: GatewayConfig,
    transport: T,
    cache: ResponseCache,
}

impl GatewayClient<UreqTransport> {
    pub fn new(config: GatewayConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GatewayClient<T> {
    pub fn with_transport(config: GatewayConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            cache: ResponseCache::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Invoke `method` and return the response with call metadata removed.
    fn call(
        &self,
        credentials: &Credentials,
        method: &str,
        params: Map<String, Value>,
        cached: bool,
    ) -> Result<Value, GatewayError> {
        let form = encode_form(credentials, params);
        let namespace = method.split('.').next().unwrap_or(method);
        let mut api_domain = self.config.api_domain.clone();
        let mut redirected = false;

        loop {
            let target = format!("https://{namespace}.{api_domain}/{method}");
            let url = proxy::check_target(&target, &self.config.allowed_host_suffix)?;
            let key = ResponseCache::fingerprint(url.as_str(), &form);

            let hit = if cached { self.cache.get(&key) } else { None };
            let mut response = match hit {
                Some(hit) => {
                    tracing::debug!(method, "served from cache");
                    hit
                }
                None => {
                    let address = match &self.config.proxy_base {
                        Some(base) => proxy::proxied_url(base, &url),
                        None => url.to_string(),
                    };
                    tracing::debug!(method, %api_domain, "calling platform");
                    let body = self
                        .transport
                        .post_form(&address, &form)
                        .map_err(|e| transport_error(method, e.to_string()))?;
                    let response: Value = serde_json::from_str(&body).map_err(|e| {
                        transport_error(method, format!("response is not JSON: {e}"))
                    })?;
                    if cached && is_cacheable(&response) {
                        self.cache.insert(key, &response);
                    }
                    response
                }
            };

            let code = response
                .get("errorCode")
                .and_then(Value::as_i64)
                .ok_or_else(|| transport_error(method, "response carries no errorCode".into()))?;

            if code == WRONG_DATA_CENTER && !redirected {
                if let Some(domain) = response.get("apiDomain").and_then(Value::as_str) {
                    tracing::info!(method, from = %api_domain, to = domain, "redirected to data centre");
                    api_domain = domain.to_string();
                    redirected = true;
                    continue;
                }
            }

            if code != 0 {
                let detail = ["errorDetails", "errorMessage"]
                    .iter()
                    .find_map(|k| response.get(*k).and_then(Value::as_str))
                    .map_or_else(|| format!("error code {code}"), str::to_string);
                tracing::warn!(method, code, %detail, "platform rejected call");
                return Err(GatewayError::Remote { code, detail });
            }

            sanitize::strip_response_metadata(&mut response);
            return Ok(response);
        }
    }
}

/// Only successes and data-centre redirects are worth replaying.
fn is_cacheable(response: &Value) -> bool {
    matches!(
        response.get("errorCode").and_then(Value::as_i64),
        Some(0 | WRONG_DATA_CENTER)
    )
}

impl<T: Transport> SettingsGateway for GatewayClient<T> {
    fn fetch_user_sites(
        &self,
        credentials: &Credentials,
        partner_id: Option<&str>,
    ) -> Result<Vec<PartnerSites>, GatewayError> {
        let mut params = Map::new();
        if let Some(id) = partner_id {
            params.insert("targetPartnerID".into(), Value::String(id.to_string()));
        }
        let mut response = self.call(credentials, "admin.getUserSites", params, true)?;
        let sites = response.get_mut("sites").map(Value::take).unwrap_or(Value::Array(vec![]));
        serde_json::from_value(sites)
            .map_err(|e| transport_error("admin.getUserSites", format!("unexpected sites payload: {e}")))
    }

    fn fetch_schema(&self, credentials: &Credentials, api_key: &str) -> Result<Value, GatewayError> {
        let mut schema = self.call(credentials, "accounts.getSchema", site_params(api_key), false)?;
        sanitize::sanitize_schema(&mut schema);
        Ok(schema)
    }

    fn fetch_policies(&self, credentials: &Credentials, api_key: &str) -> Result<Value, GatewayError> {
        self.call(credentials, "accounts.getPolicies", site_params(api_key), false)
    }

    fn fetch_screensets(&self, credentials: &Credentials, api_key: &str) -> Result<Value, GatewayError> {
        let mut response = self.call(credentials, "accounts.getScreenSets", site_params(api_key), false)?;
        Ok(response
            .get_mut("screenSets")
            .map(Value::take)
            .unwrap_or(Value::Array(vec![])))
    }

    fn update_schema(&self, credentials: &Credentials, api_key: &str, schema: &Value) -> Result<(), GatewayError> {
        let schema = expect_object("schema", schema)?;
        let mut params = site_params(api_key);
        for key in ["profileSchema", "dataSchema"] {
            if let Some(section) = schema.get(key) {
                params.insert(key.into(), section.clone());
            }
        }
        self.call(credentials, "accounts.setSchema", params, false)?;
        Ok(())
    }

    fn update_policies(&self, credentials: &Credentials, api_key: &str, policies: &Value) -> Result<(), GatewayError> {
        let mut params = expect_object("policies", policies)?.clone();
        params.insert("apiKey".into(), Value::String(api_key.to_string()));
        self.call(credentials, "accounts.setPolicies", params, false)?;
        Ok(())
    }

    fn update_screensets(&self, credentials: &Credentials, api_key: &str, screensets: &Value) -> Result<(), GatewayError> {
        let Some(screensets) = screensets.as_array() else {
            return Err(GatewayError::ValidationInput(
                "screen-sets must be a JSON array".into(),
            ));
        };
        for screenset in screensets {
            let mut params = site_params(api_key);
            for key in ["screenSetID", "html", "css"] {
                if let Some(value) = screenset.get(key) {
                    params.insert(key.into(), value.clone());
                }
            }
            self.call(credentials, "accounts.setScreenSet", params, false)?;
        }
        Ok(())
    }
}

fn site_params(api_key: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("apiKey".into(), Value::String(api_key.to_string()));
    params
}

fn expect_object<'v>(what: &str, value: &'v Value) -> Result<&'v Map<String, Value>, GatewayError> {
    value
        .as_object()
        .ok_or_else(|| GatewayError::ValidationInput(format!("{what} must be a JSON object")))
}

fn transport_error(method: &str, message: String) -> GatewayError {
    GatewayError::Transport {
        method: method.to_string(),
        message,
    }
}

/// Form body in sorted key order. Nulls are dropped, strings pass through,
/// everything else is sent as JSON text.
fn encode_form(credentials: &Credentials, params: Map<String, Value>) -> Vec<(String, String)> {
    let mut form: BTreeMap<String, String> = params
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect();
    form.insert("userKey".into(), credentials.user_key.clone());
    form.insert("secret".into(), credentials.user_secret.clone());
    form.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn form_serializes_structured_values_as_json() {
        let mut params = Map::new();
        params.insert("apiKey".into(), json!("3_abc"));
        params.insert("profileSchema".into(), json!({"fields": {}}));
        params.insert("limit".into(), json!(5));
        params.insert("skipped".into(), Value::Null);

        let form = encode_form(&Credentials::new("AK", "s3cret"), params);
        assert_eq!(
            form,
            vec![
                ("apiKey".to_string(), "3_abc".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("profileSchema".to_string(), r#"{"fields":{}}"#.to_string()),
                ("secret".to_string(), "s3cret".to_string()),
                ("userKey".to_string(), "AK".to_string()),
            ]
        );
    }
}
