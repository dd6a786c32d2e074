//! Behavioural properties of the validate diff over realistic payloads.

use rstest::rstest;
use serde_json::{json, Value};
use sitekit_core::{DiffKind, SettingKind};
use sitekit_diff::{abbreviate, classify, compare, diff_json};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn schema_a() -> Value {
    json!({
        "profileSchema": {"fields": {"email": {"required": true}, "firstName": {}}},
        "dataSchema": {"fields": {"terms": {"type": "boolean", "required": false}}}
    })
}

fn schema_b() -> Value {
    json!({
        "profileSchema": {"fields": {"email": {"required": false}, "lastName": {}}},
        "dataSchema": {"fields": {
            "terms": {"type": "boolean", "required": false},
            "newsletter": {"type": "boolean"}
        }}
    })
}

fn screensets(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "screenSetID": format!("Default-RegistrationLogin-{i}"),
                    "html": format!("<div class=\"screen-{i}\">{}</div>", "x".repeat(80)),
                    "css": ".gigya-screen { color: #333; }"
                })
            })
            .collect(),
    )
}

fn policies() -> Value {
    json!({"registration": {"requireCaptcha": false}, "passwordComplexity": {"minLength": 8}})
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[rstest]
#[case("null", Value::Null)]
#[case("scalar", json!(42))]
#[case("schema", schema_a())]
#[case("screensets", screensets(12))]
fn self_diff_is_unchanged_only(#[case] label: &str, #[case] value: Value) {
    let parts = diff_json(&value, &value);
    assert!(
        parts.iter().all(|p| p.kind == DiffKind::Unchanged),
        "[{label}] expected only unchanged parts"
    );
    assert!(!classify(&parts).is_different(), "[{label}]");
}

#[rstest]
#[case("schema", schema_a(), schema_b())]
#[case("grown_array", screensets(2), screensets(5))]
#[case("type_change", policies(), json!(["not", "an", "object"]))]
#[case("empty_vs_full", json!({}), policies())]
fn reversed_diff_swaps_added_and_removed(
    #[case] label: &str,
    #[case] a: Value,
    #[case] b: Value,
) {
    let forward = compare(SettingKind::Schema, a.clone(), b.clone()).counts;
    let backward = compare(SettingKind::Schema, b, a).counts;
    assert_eq!(forward.added, backward.removed, "[{label}] added/removed");
    assert_eq!(forward.removed, backward.added, "[{label}] removed/added");
    assert_eq!(forward.changed, backward.changed, "[{label}] changed");
}

#[test]
fn long_runs_abbreviate_within_bounds() {
    let parts = diff_json(&screensets(1), &screensets(20));
    assert!(!parts.is_empty());
    for part in &parts {
        let limit = abbreviate::threshold(part.kind);
        let len = part.value.chars().count();
        assert!(part.value.ends_with('\n') && !part.value.ends_with("\n\n"));
        match &part.abbreviated_value {
            None => assert!(len <= limit),
            Some(short) => {
                assert!(len > limit);
                assert!(short.chars().count() < len);
                assert!(short.contains("\r\n...\r\n"));
            }
        }
    }
    let added = parts.iter().find(|p| p.kind == DiffKind::Added).expect("added run");
    assert!(added.abbreviated_value.is_some(), "19 screen-sets exceed the threshold");
}
