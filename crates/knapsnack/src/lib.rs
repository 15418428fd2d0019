//! Knapsnack: WASM-first intake wizard for the Knapsnack diet planner.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { IntakeApp } from './knapsnack.js';
//!
//! async function main() {
//!     await init();
//!     const app = new IntakeApp();
//!     app.on_submit((form) => fetch('/optimize', { method: 'POST', body: form }));
//!     app.edit_field('age', '"34"');
//!     app.next();
//!     render(JSON.parse(app.state_json()));
//! }
//! ```

#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    unreachable_pub
)]

pub use knapsnack_core::*;
pub use knapsnack_yaml as yaml;

pub mod browser;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub use browser::IntakeApp;

pub use browser::{Storage, StorageType};
pub use session::{IntakeSession, RatioView, SessionView};
