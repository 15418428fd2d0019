//! YAML manifest parser for the Knapsnack intake wizard.
//!
//! A manifest names the storage key, the measurement limits and the ordered
//! wizard steps. [`Manifest::catalog`] turns it into the
//! [`knapsnack_core::StepCatalog`] the wizard walks.

mod error;
mod manifest;

pub use error::ParseError;
pub use manifest::{Manifest, StepConfig, ValidatorConfig, MANIFEST_VERSION};
