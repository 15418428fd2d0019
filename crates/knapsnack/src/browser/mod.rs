//! Browser runtime for the intake wizard.
//!
//! This module binds the wizard to `localStorage` and exposes it to
//! JavaScript through wasm-bindgen.

// WASM-only modules
#[cfg(target_arch = "wasm32")]
pub mod app;

// Cross-platform modules
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use app::IntakeApp;
pub use storage::{Storage, StorageType};
