//! GatewayClient behaviour against a scripted transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use rstest::rstest;
use serde_json::{json, Value};
use sitekit_core::{Credentials, GatewayError, SettingsGateway};
use sitekit_gateway::{GatewayClient, GatewayConfig, Transport, TransportFailure};

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Scripted {
    replies: Mutex<VecDeque<Result<String, TransportFailure>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl Scripted {
    fn replying(replies: Vec<Value>) -> Self {
        let scripted = Scripted::default();
        scripted
            .replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| Ok(r.to_string())));
        scripted
    }

    fn failing(message: &str) -> Self {
        let scripted = Scripted::default();
        scripted
            .replies
            .lock()
            .unwrap()
            .push_back(Err(TransportFailure(message.to_string())));
        scripted
    }

    fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|(url, _)| url).collect()
    }
}

impl Transport for Scripted {
    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, TransportFailure> {
        self.calls.lock().unwrap().push((url.to_string(), form.to_vec()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure("no scripted reply".into())))
    }
}

fn param<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn ok(body: Value) -> Value {
    let mut body = body;
    let map = body.as_object_mut().unwrap();
    map.insert("errorCode".into(), json!(0));
    map.insert("statusCode".into(), json!(200));
    map.insert("statusReason".into(), json!("OK"));
    map.insert("callId".into(), json!("abc123"));
    map.insert("time".into(), json!("2026-01-01T00:00:00.000Z"));
    body
}

fn client(replies: Vec<Value>) -> GatewayClient<Scripted> {
    GatewayClient::with_transport(GatewayConfig::default(), Scripted::replying(replies))
}

fn creds() -> Credentials {
    Credentials::new("AKEY", "s3cret")
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

#[test]
fn requests_carry_credentials_and_target_namespace_host() {
    let client = client(vec![ok(json!({"registration": {}}))]);
    let policies = client.fetch_policies(&creds(), "3_site").unwrap();
    assert_eq!(policies, json!({"registration": {}}));

    let calls = client.transport().calls();
    assert_eq!(calls.len(), 1);
    let (url, form) = &calls[0];
    assert_eq!(url, "https://accounts.us1.gigya.com/accounts.getPolicies");
    assert_eq!(param(form, "apiKey"), Some("3_site"));
    assert_eq!(param(form, "userKey"), Some("AKEY"));
    assert_eq!(param(form, "secret"), Some("s3cret"));
}

#[test]
fn proxy_base_rewrites_address() {
    let config = GatewayConfig {
        proxy_base: Some("http://localhost:5050".into()),
        ..GatewayConfig::default()
    };
    let client =
        GatewayClient::with_transport(config, Scripted::replying(vec![ok(json!({}))]));
    client.fetch_policies(&creds(), "3_site").unwrap();

    let url = &client.transport().urls()[0];
    assert!(url.starts_with("http://localhost:5050/proxy/https%253A%252F%252Faccounts.us1"));
}

#[test]
fn non_whitelisted_domain_is_rejected_before_sending() {
    let config = GatewayConfig {
        api_domain: "example.com".into(),
        ..GatewayConfig::default()
    };
    let client = GatewayClient::with_transport(config, Scripted::default());
    let err = client.fetch_policies(&creds(), "3_site").unwrap_err();
    assert!(matches!(err, GatewayError::ValidationInput(_)));
    assert!(client.transport().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn wrong_data_center_retries_once_on_named_domain() {
    let client = client(vec![
        json!({"errorCode": 301001, "apiDomain": "eu1.gigya.com", "errorMessage": "redirect"}),
        ok(json!({"screenSets": [{"screenSetID": "Default-Login"}]})),
    ]);
    let screensets = client.fetch_screensets(&creds(), "3_eu").unwrap();
    assert_eq!(screensets, json!([{"screenSetID": "Default-Login"}]));
    assert_eq!(
        client.transport().urls(),
        vec![
            "https://accounts.us1.gigya.com/accounts.getScreenSets",
            "https://accounts.eu1.gigya.com/accounts.getScreenSets",
        ]
    );
}

#[test]
fn second_redirect_surfaces_as_remote_error() {
    let redirect = json!({"errorCode": 301001, "apiDomain": "eu1.gigya.com", "errorMessage": "moved"});
    let client = client(vec![redirect.clone(), redirect]);
    let err = client.fetch_policies(&creds(), "3_site").unwrap_err();
    assert_eq!(
        err,
        GatewayError::Remote {
            code: 301001,
            detail: "moved".into()
        }
    );
    assert_eq!(client.transport().calls().len(), 2);
}

#[test]
fn redirect_to_foreign_domain_is_rejected() {
    let client = client(vec![json!({"errorCode": 301001, "apiDomain": "attacker.net"})]);
    let err = client.fetch_policies(&creds(), "3_site").unwrap_err();
    assert!(matches!(err, GatewayError::ValidationInput(_)));
    assert_eq!(client.transport().calls().len(), 1);
}

#[rstest]
#[case(json!({"errorCode": 400006, "errorDetails": "Invalid parameter", "errorMessage": "Bad"}), "Invalid parameter")]
#[case(json!({"errorCode": 403003, "errorMessage": "Invalid request signature"}), "Invalid request signature")]
#[case(json!({"errorCode": 500001}), "error code 500001")]
fn remote_error_detail(#[case] reply: Value, #[case] expected: &str) {
    let client = client(vec![reply]);
    match client.fetch_schema(&creds(), "3_site").unwrap_err() {
        GatewayError::Remote { detail, .. } => assert_eq!(detail, expected),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[test]
fn network_failure_is_unrecoverable() {
    let client = GatewayClient::with_transport(GatewayConfig::default(), Scripted::failing("timed out"));
    let err = client.fetch_policies(&creds(), "3_site").unwrap_err();
    assert!(err.is_unrecoverable());
    assert!(err.to_string().contains("accounts.getPolicies"));
}

#[test]
fn non_json_body_is_a_transport_error() {
    let scripted = Scripted::default();
    scripted
        .replies
        .lock()
        .unwrap()
        .push_back(Ok("<html>bad gateway</html>".into()));
    let client = GatewayClient::with_transport(GatewayConfig::default(), scripted);
    let err = client.fetch_policies(&creds(), "3_site").unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
}

// ---------------------------------------------------------------------------
// Partner listing and caching
// ---------------------------------------------------------------------------

#[test]
fn user_sites_are_cached_per_request() {
    let client = client(vec![
        ok(json!({"sites": [{"partnerID": 123, "sites": [{"apiKey": "3_a", "baseDomain": "a.com"}]}]})),
        ok(json!({"sites": [{"partnerID": "123", "sites": []}]})),
    ]);

    let first = client.fetch_user_sites(&creds(), None).unwrap();
    let again = client.fetch_user_sites(&creds(), None).unwrap();
    assert_eq!(first, again);
    assert_eq!(first[0].partner_id, "123");
    assert_eq!(first[0].sites[0].api_key, "3_a");
    assert_eq!(client.transport().calls().len(), 1);

    let filtered = client.fetch_user_sites(&creds(), Some("123")).unwrap();
    assert!(filtered[0].sites.is_empty());
    let calls = client.transport().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[1].1, "targetPartnerID"), Some("123"));
}

#[test]
fn failed_user_sites_listing_is_not_cached() {
    let client = client(vec![
        json!({"errorCode": 500001, "errorMessage": "General Server Error"}),
        ok(json!({"sites": [{"partnerID": "123", "sites": []}]})),
    ]);

    let err = client.fetch_user_sites(&creds(), None).unwrap_err();
    assert!(matches!(err, GatewayError::Remote { code: 500001, .. }));

    let sites = client.fetch_user_sites(&creds(), None).unwrap();
    assert_eq!(sites[0].partner_id, "123");
    assert_eq!(client.transport().calls().len(), 2);
}

#[test]
fn settings_reads_are_not_cached() {
    let client = client(vec![ok(json!({"a": 1})), ok(json!({"a": 2}))]);
    assert_eq!(client.fetch_policies(&creds(), "3_site").unwrap(), json!({"a": 1}));
    assert_eq!(client.fetch_policies(&creds(), "3_site").unwrap(), json!({"a": 2}));
}

// ---------------------------------------------------------------------------
// Settings payloads
// ---------------------------------------------------------------------------

#[test]
fn fetched_schema_is_sanitized() {
    let client = client(vec![ok(json!({
        "profileSchema": {"unique": [], "fields": {"email": {"type": "string", "required": true}}},
        "dataSchema": {"fields": {"untyped": {}, "terms": {"type": "boolean"}}}
    }))]);
    let schema = client.fetch_schema(&creds(), "3_site").unwrap();
    assert_eq!(
        schema,
        json!({
            "profileSchema": {"fields": {"email": {"required": true}}},
            "dataSchema": {"fields": {"terms": {"type": "boolean"}}}
        })
    );
}

#[test]
fn schema_update_sends_both_sections_as_json() {
    let client = client(vec![ok(json!({}))]);
    let schema = json!({"profileSchema": {"fields": {}}, "dataSchema": {"fields": {"x": {"type": "string"}}}});
    client.update_schema(&creds(), "3_dest", &schema).unwrap();

    let (url, form) = &client.transport().calls()[0];
    assert!(url.ends_with("/accounts.setSchema"));
    assert_eq!(param(form, "profileSchema"), Some(r#"{"fields":{}}"#));
    assert_eq!(param(form, "dataSchema"), Some(r#"{"fields":{"x":{"type":"string"}}}"#));
}

#[test]
fn policies_update_flattens_top_level_sections() {
    let client = client(vec![ok(json!({}))]);
    let policies = json!({"registration": {"requireCaptcha": true}, "accountOptions": {"loginIdentifiers": "email"}});
    client.update_policies(&creds(), "3_dest", &policies).unwrap();

    let (_, form) = &client.transport().calls()[0];
    assert_eq!(param(form, "apiKey"), Some("3_dest"));
    assert_eq!(param(form, "registration"), Some(r#"{"requireCaptcha":true}"#));
    assert_eq!(param(form, "accountOptions"), Some(r#"{"loginIdentifiers":"email"}"#));
}

#[test]
fn screensets_update_sends_one_call_per_set() {
    let client = client(vec![ok(json!({})), ok(json!({}))]);
    let screensets = json!([
        {"screenSetID": "Login", "html": "<div/>", "css": ".a{}", "translations": {}},
        {"screenSetID": "Profile", "html": "<form/>", "css": ""}
    ]);
    client.update_screensets(&creds(), "3_dest", &screensets).unwrap();

    let calls = client.transport().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[0].1, "screenSetID"), Some("Login"));
    assert_eq!(param(&calls[0].1, "translations"), None);
    assert_eq!(param(&calls[1].1, "html"), Some("<form/>"));
}

#[test]
fn screensets_update_stops_at_first_failure() {
    let client = client(vec![
        json!({"errorCode": 400009, "errorMessage": "Validation error"}),
        ok(json!({})),
    ]);
    let screensets = json!([{"screenSetID": "A"}, {"screenSetID": "B"}]);
    let err = client.update_screensets(&creds(), "3_dest", &screensets).unwrap_err();
    assert!(matches!(err, GatewayError::Remote { code: 400009, .. }));
    assert_eq!(client.transport().calls().len(), 1);
}

#[rstest]
#[case("schema", json!([1, 2]))]
#[case("policies", json!("text"))]
#[case("screensets", json!({"screenSetID": "A"}))]
fn malformed_update_payload_is_rejected_locally(#[case] kind: &str, #[case] payload: Value) {
    let client = client(vec![]);
    let result = match kind {
        "schema" => client.update_schema(&creds(), "3_dest", &payload),
        "policies" => client.update_policies(&creds(), "3_dest", &payload),
        _ => client.update_screensets(&creds(), "3_dest", &payload),
    };
    assert!(matches!(result, Err(GatewayError::ValidationInput(_))));
    assert!(client.transport().calls().is_empty());
}
