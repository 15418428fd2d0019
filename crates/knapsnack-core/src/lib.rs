//! Core of the Knapsnack intake wizard.
//!
//! This crate holds everything the wizard needs apart from rendering:
//! - Form model: [`FormData`], [`FieldKey`], [`FieldValue`], [`MacroRatios`]
//! - Macro split sliders: [`RatioConstraintEngine`]
//! - Step catalog and validators: [`StepCatalog`], [`StepValidator`]
//! - Snapshot persistence: [`PersistenceStore`] over a [`KeyValueSlot`]
//! - The state machine itself: [`WizardController`]

mod catalog;
mod error;
mod form;
mod persistence;
mod ratio;
mod validation;
mod wizard;

pub use catalog::{IntakeLimits, Limit, StepCatalog, StepDescriptor};
pub use error::{CatalogError, FormError, StorageError};
pub use form::{Entry, FieldKey, FieldValue, FormData, Gender, MacroRatios, SmokingStatus};
pub use persistence::{
    AbsentReason, KeyValueSlot, LoadOutcome, MemorySlot, PersistenceStore, Snapshot,
    DEFAULT_STORAGE_KEY, SNAPSHOT_VERSION,
};
pub use ratio::{Channel, RatioConstraintEngine, RatioEvent, RatioReceiver};
pub use validation::{
    Bounds, Custom, IntegerRange, RatiosPresent, Required, StepValidator, ValidationResult,
};
pub use wizard::{Transition, WizardController, WizardView, RATIO_GATE_MESSAGE};
