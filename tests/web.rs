//! Browser-side checks of the JS surface. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use proxy_lab_engine::*;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Plain JS object (not a `Map`) from a JSON literal.
fn options(json: serde_json::Value) -> JsValue {
    json.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).unwrap()
}

#[wasm_bindgen_test]
fn advance_returns_step_result() {
    let mut lab = CacheLab::new();
    assert!(lab.submit_request());
    let step = lab.advance(1000);
    assert!(!step.is_null());
    let frame = lab.get_frame();
    assert!(!frame.is_null());
}

#[wasm_bindgen_test]
fn with_options_applies_partial_config() {
    let mut lab = CacheLab::with_options(options(serde_json::json!({ "fresh_ttl_secs": 3 }))).unwrap();
    lab.submit_request();
    lab.run_until_idle();
    assert_eq!(lab.cache_entry().remaining_ttl_secs, 3);
}

#[wasm_bindgen_test]
fn with_options_rejects_invalid_config() {
    assert!(CacheLab::with_options(options(serde_json::json!({ "tick_interval_ms": 0 }))).is_err());
    assert!(CacheLab::with_options(JsValue::from_str("nope")).is_err());
}

#[wasm_bindgen_test]
fn access_log_crosses_boundary() {
    let mut lab = CacheLab::new();
    lab.submit_request();
    lab.run_until_idle();
    let lines: Vec<String> = serde_wasm_bindgen::from_value(lab.get_access_log()).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("MISS"));
}
