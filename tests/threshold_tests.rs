use std::collections::BTreeMap;

use heapbench::{
    HeapBenchError,
    record::{CaseKey, TestKind},
    thresholds::{ThresholdConfig, ThresholdOverride, ThresholdSet},
};
use serde_json::{Value, json};

fn mixed_key() -> CaseKey {
    CaseKey::new(TestKind::Mixed, 100_000)
}

#[test]
fn test_override_replaces_only_present_fields() {
    let set = ThresholdSet::from_json_str(
        r#"{
            "default": {"min_speedup_p50": 1.0, "min_speedup_p95": 1.0},
            "overrides": {"mixed (50/50)@100000": {"min_speedup_p50": 2.0}}
        }"#,
    )
    .expect("thresholds");
    assert_eq!(set.resolve(&mixed_key()), ThresholdConfig::new(2.0, 1.0));
    for other in [
        CaseKey::new(TestKind::Mixed, 10_000),
        CaseKey::new(TestKind::PushOnly, 100_000),
        CaseKey::new(TestKind::PopOnly, 1_000_000),
    ] {
        assert_eq!(set.resolve(&other), ThresholdConfig::new(1.0, 1.0));
    }
}

#[test]
fn test_override_p95_only() {
    let mut overrides = BTreeMap::new();
    overrides.insert(mixed_key(), ThresholdOverride::p95(3.0));
    let set = ThresholdSet::new(ThresholdConfig::new(1.2, 1.1), overrides).expect("set");
    assert_eq!(set.resolve(&mixed_key()), ThresholdConfig::new(1.2, 3.0));
}

#[test]
fn test_missing_overrides_is_empty_mapping() {
    let set = ThresholdSet::from_json_str(
        r#"{"default": {"min_speedup_p50": 1.5, "min_speedup_p95": 1.25}}"#,
    )
    .expect("thresholds");
    assert!(set.overrides().is_empty());
    assert_eq!(set.defaults(), ThresholdConfig::new(1.5, 1.25));

    let set = ThresholdSet::from_json_str(
        r#"{"default": {"min_speedup_p50": 1.5, "min_speedup_p95": 1.25}, "overrides": null}"#,
    )
    .expect("null overrides");
    assert!(set.overrides().is_empty());
}

#[test]
fn test_missing_default_fields_are_configuration_errors() {
    let cases = [
        (r#"{"overrides": {}}"#, "'default'"),
        (r#"{"default": {"min_speedup_p95": 1.0}}"#, "min_speedup_p50"),
        (r#"{"default": {"min_speedup_p50": 1.0}}"#, "min_speedup_p95"),
        (r#"{"default": {}}"#, "min_speedup_p50"),
    ];
    for (text, field) in cases {
        let err = ThresholdSet::from_json_str(text).expect_err(text);
        match err {
            HeapBenchError::Configuration(msg) => assert!(msg.contains(field), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn test_malformed_documents_are_configuration_errors() {
    for text in [
        "not json",
        r#"{"default": {"min_speedup_p50": "fast", "min_speedup_p95": 1.0}}"#,
        r#"{"default": {"min_speedup_p50": 0.0, "min_speedup_p95": 1.0}}"#,
        r#"{"default": {"min_speedup_p50": -1.0, "min_speedup_p95": 1.0}}"#,
        r#"{"default": {"min_speedup_p50": 1.0, "min_speedup_p95": 1.0},
            "overrides": {"push-only": {"min_speedup_p50": 2.0}}}"#,
        r#"{"default": {"min_speedup_p50": 1.0, "min_speedup_p95": 1.0},
            "overrides": {"push-only@1000": {"min_speedup_p95": 0.0}}}"#,
    ] {
        let err = ThresholdSet::from_json_str(text).expect_err(text);
        assert!(matches!(err, HeapBenchError::Configuration(_)), "{err:?}");
    }
}

#[test]
fn test_load_reads_file_and_reports_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("thresholds.json");
    std::fs::write(
        &path,
        r#"{"default": {"min_speedup_p50": 1.1, "min_speedup_p95": 1.05}}"#,
    )
    .expect("write");
    let set = ThresholdSet::load(&path).expect("load");
    assert_eq!(set.defaults(), ThresholdConfig::new(1.1, 1.05));

    let err = ThresholdSet::load(&dir.path().join("absent.json")).expect_err("missing");
    assert!(matches!(err, HeapBenchError::Io(_)));
}

#[test]
fn test_serializes_as_consumed_shape() {
    let set = ThresholdSet::from_json_str(
        r#"{
            "default": {"min_speedup_p50": 1.0, "min_speedup_p95": 1.0},
            "overrides": {"push-only@1000": {"min_speedup_p95": 1.5}}
        }"#,
    )
    .expect("thresholds");
    let value: Value = serde_json::to_value(&set).expect("json");
    assert_eq!(
        value,
        json!({
            "default": {"min_speedup_p50": 1.0, "min_speedup_p95": 1.0},
            "overrides": {"push-only@1000": {"min_speedup_p95": 1.5}}
        })
    );
}
