//! WASM application entry point.

use super::storage::Storage;
use crate::session::IntakeSession;
use knapsnack_yaml::Manifest;
use wasm_bindgen::prelude::*;

/// Intake wizard exported to JavaScript.
///
/// Every method that changes state persists to `localStorage` before it
/// returns. Outcomes and views cross the boundary as JSON strings.
#[wasm_bindgen]
pub struct IntakeApp {
    session: IntakeSession<Storage>,
}

#[wasm_bindgen]
impl IntakeApp {
    /// Create the wizard from a manifest, or the standard intake when none is
    /// given, and resume any progress saved in `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new(manifest_yaml: Option<String>) -> Result<IntakeApp, JsValue> {
        console_error_panic_hook::set_once();

        let manifest = match manifest_yaml {
            Some(yaml) => Manifest::from_yaml(&yaml).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Manifest::standard(),
        };

        let session = IntakeSession::from_manifest(&manifest, Storage::local())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(reason) = session.wizard().fresh_start_reason() {
            log(&format!("knapsnack: no saved progress ({reason:?}), starting fresh"));
        }
        Ok(Self { session })
    }

    /// Register the submit handler. It receives the finished form as JSON.
    pub fn on_submit(&mut self, callback: js_sys::Function) {
        self.session.on_submit(move |form| {
            log("knapsnack: intake submitted");
            let json = match serde_json::to_string(form) {
                Ok(json) => json,
                Err(e) => {
                    web_sys::console::error_2(
                        &JsValue::from_str("knapsnack: failed to encode form"),
                        &JsValue::from_str(&e.to_string()),
                    );
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                web_sys::console::error_2(&JsValue::from_str("knapsnack: submit handler threw"), &e);
            }
        });
    }

    /// Validate the current step and advance, or submit on the last step.
    /// Returns the transition as JSON.
    pub fn next(&mut self) -> Result<String, JsValue> {
        let transition = self.session.next();
        serde_json::to_string(&transition).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Go back one step. Returns the new step index.
    pub fn previous(&mut self) -> usize {
        self.session.previous()
    }

    /// Replace one field with a JSON-encoded value.
    pub fn edit_field(&mut self, key: &str, value_json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json)
            .map_err(|e| JsValue::from_str(&format!("JSON parse error: {e}")))?;
        self.session
            .edit_field(key, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Move one macro slider. Returns true when the three shares total 100.
    pub fn set_channel(&mut self, name: &str, value: i32) -> Result<bool, JsValue> {
        self.session
            .set_channel(name, i64::from(value))
            .map(|event| event.is_some())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current view as JSON.
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.view()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Clear saved progress and start over.
    pub fn reset(&mut self) -> bool {
        self.session.reset()
    }
}

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console.
#[wasm_bindgen]
pub fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}
