//! WASM browser tests - run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use knapsnack::{IntakeApp, KeyValueSlot, Storage, DEFAULT_STORAGE_KEY};

fn clear_saved_progress() {
    Storage::local()
        .remove(DEFAULT_STORAGE_KEY)
        .expect("localStorage available");
}

// ============================================================================
// localStorage binding
// ============================================================================

#[wasm_bindgen_test]
fn test_local_storage_roundtrip() {
    let storage = Storage::local();
    storage.write("knapsnack_test", "{\"step\":2}").expect("write");
    assert_eq!(
        storage.read("knapsnack_test").expect("read"),
        Some("{\"step\":2}".to_string())
    );
    storage.remove("knapsnack_test").expect("remove");
    assert_eq!(storage.read("knapsnack_test").expect("read"), None);
}

// ============================================================================
// IntakeApp
// ============================================================================

#[wasm_bindgen_test]
fn test_app_persists_to_local_storage() {
    clear_saved_progress();
    let mut app = IntakeApp::new(None).expect("standard manifest");
    let outcome = app.next().expect("transition json");
    assert!(outcome.contains("\"advanced\""));

    app.edit_field("age", "\"33\"").expect("valid edit");
    let saved = Storage::local()
        .read(DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("snapshot written");
    assert!(saved.contains("\"age\":\"33\""));

    let resumed = IntakeApp::new(None).expect("standard manifest");
    let state: serde_json::Value =
        serde_json::from_str(&resumed.state_json().expect("state")).expect("json");
    assert_eq!(state["step"], 1);
    clear_saved_progress();
}

#[wasm_bindgen_test]
fn test_app_rejects_bad_field() {
    clear_saved_progress();
    let mut app = IntakeApp::new(None).expect("standard manifest");
    assert!(app.edit_field("eyeColor", "\"blue\"").is_err());
    assert!(app.edit_field("age", "not json").is_err());
    clear_saved_progress();
}

#[wasm_bindgen_test]
fn test_app_corrupt_storage_starts_fresh() {
    Storage::local()
        .write(DEFAULT_STORAGE_KEY, "{broken")
        .expect("write");
    let app = IntakeApp::new(None).expect("standard manifest");
    let state: serde_json::Value =
        serde_json::from_str(&app.state_json().expect("state")).expect("json");
    assert_eq!(state["step"], 0);
    assert!(state["error"].is_null());
    clear_saved_progress();
}

#[wasm_bindgen_test]
fn test_app_sliders() {
    let yaml = "storage_key: knapsnack_slider_test\nsteps:\n  - field: macroRatios\n    title: Macros\n";
    let mut app = IntakeApp::new(Some(yaml.to_string())).expect("manifest");
    assert!(!app.set_channel("protein", 60).expect("known channel"));
    assert!(app.set_channel("fats", 0).expect("known channel"));
    assert!(app.set_channel("sugar", 10).is_err());
    assert!(app.reset());
}
