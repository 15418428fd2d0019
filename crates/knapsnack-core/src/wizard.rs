//! Wizard state machine.
//!
//! The controller walks an injected [`StepCatalog`] one step at a time. Its
//! state is the step index, the accumulated [`FormData`] and a transient error
//! message. Every committed change (a field edit or a step move) is written
//! through the [`PersistenceStore`] straight away, so a reload resumes where
//! the user left off.
//!
//! Validation failures never surface as `Err`: they block the transition and
//! land in [`WizardController::error`].

use crate::catalog::{StepCatalog, StepDescriptor};
use crate::error::FormError;
use crate::form::{FieldKey, FieldValue, FormData, MacroRatios};
use crate::persistence::{AbsentReason, KeyValueSlot, LoadOutcome, PersistenceStore, Snapshot};
use crate::ratio::RatioReceiver;
use crate::validation::ValidationResult;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Error set when the last step is submitted without a valid macro split.
pub const RATIO_GATE_MESSAGE: &str =
    "Please ensure your macro ratios total 100% and are within the guidelines";

/// Outcome of [`WizardController::next`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Transition {
    /// Moved forward to `step`.
    Advanced {
        /// New step index
        step: usize,
    },
    /// Stayed put; `message` is now the wizard's error.
    Blocked {
        /// Validation or ratio-gate message
        message: String,
    },
    /// The last step passed and the submit handler received the form.
    Submitted(FormData),
}

/// Serializable picture of the wizard for a front-end to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    /// Current step index
    pub step: usize,
    /// Total number of steps
    pub step_count: usize,
    /// Title of the current step
    pub title: String,
    /// Field edited by the current step
    pub field: FieldKey,
    /// Whether a Previous action should be offered
    pub can_go_back: bool,
    /// Whether Next will attempt submission
    pub is_last_step: bool,
    /// Fraction of the wizard reached, `(step + 1) / step_count`
    pub progress: f32,
    /// Current error message
    pub error: Option<String>,
    /// Accumulated form data
    pub data: FormData,
}

type SubmitHandler = Box<dyn FnMut(&FormData)>;

/// The intake wizard.
pub struct WizardController<K: KeyValueSlot> {
    catalog: StepCatalog,
    store: PersistenceStore<K>,
    step: usize,
    form: FormData,
    error: Option<String>,
    fresh_start: Option<AbsentReason>,
    on_submit: Option<SubmitHandler>,
}

impl<K: KeyValueSlot> WizardController<K> {
    /// Create a controller, restoring saved progress when the store holds a
    /// well-formed snapshot and starting from defaults otherwise.
    pub fn new(catalog: StepCatalog, store: PersistenceStore<K>) -> Self {
        let mut fresh_start = None;
        let (step, form) = match store.load() {
            LoadOutcome::Snapshot(snapshot) => {
                let last = catalog.last_index();
                let step = if snapshot.step > last {
                    warn!(
                        saved = snapshot.step,
                        last, "saved step beyond catalog, resuming at last step"
                    );
                    last
                } else {
                    snapshot.step
                };
                (step, snapshot.data)
            }
            LoadOutcome::Absent(reason) => {
                debug!(?reason, "no saved progress, starting from defaults");
                fresh_start = Some(reason);
                (0, FormData::default())
            }
        };
        Self {
            catalog,
            store,
            step,
            form,
            error: None,
            fresh_start,
            on_submit: None,
        }
    }

    /// Register the handler invoked with the finished form.
    pub fn on_submit<F>(&mut self, handler: F)
    where
        F: FnMut(&FormData) + 'static,
    {
        self.on_submit = Some(Box::new(handler));
    }

    /// Builder form of [`Self::on_submit`].
    #[must_use]
    pub fn with_submit_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&FormData) + 'static,
    {
        self.on_submit(handler);
        self
    }

    /// Why construction started from defaults, or `None` when saved progress
    /// was restored.
    pub const fn fresh_start_reason(&self) -> Option<AbsentReason> {
        self.fresh_start
    }

    /// Current step index.
    pub const fn current_step(&self) -> usize {
        self.step
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.catalog.len()
    }

    /// The current step.
    pub fn current_descriptor(&self) -> &StepDescriptor {
        self.catalog.at(self.step)
    }

    /// The catalog being walked.
    pub const fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    /// True on the first step.
    pub const fn is_first_step(&self) -> bool {
        self.step == 0
    }

    /// True on the last step.
    pub fn is_last_step(&self) -> bool {
        self.step == self.catalog.last_index()
    }

    /// Fraction of the wizard reached, for a progress bar.
    pub fn progress(&self) -> f32 {
        (self.step + 1) as f32 / self.catalog.len() as f32
    }

    /// Accumulated form data.
    pub const fn form_data(&self) -> &FormData {
        &self.form
    }

    /// Current error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Surface an external error, or clear it with `None`.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// The persistence store.
    pub const fn store(&self) -> &PersistenceStore<K> {
        &self.store
    }

    /// The state that gets persisted.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.step, self.form.clone())
    }

    /// Render-ready view of the wizard.
    pub fn view(&self) -> WizardView {
        let descriptor = self.current_descriptor();
        WizardView {
            step: self.step,
            step_count: self.catalog.len(),
            title: descriptor.title().to_string(),
            field: descriptor.field(),
            can_go_back: !self.is_first_step(),
            is_last_step: self.is_last_step(),
            progress: self.progress(),
            error: self.error.clone(),
            data: self.form.clone(),
        }
    }

    /// Replace one field, clear the error and persist.
    ///
    /// # Errors
    ///
    /// A non-finite number is refused and leaves the wizard untouched.
    pub fn edit_field(&mut self, value: FieldValue) -> Result<(), FormError> {
        let field = value.key();
        self.form.set(value)?;
        debug!(%field, "field edited");
        self.error = None;
        self.persist();
        Ok(())
    }

    /// Apply an edit arriving as JSON. A bad key or value is returned to the
    /// caller and leaves the wizard untouched.
    pub fn edit_field_json(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), FormError> {
        let key: FieldKey = key.parse()?;
        let value = FieldValue::from_json(key, value)?;
        self.edit_field(value)
    }

    /// Take a ratio engine emission as the new macro split.
    pub fn update_ratios(&mut self, ratios: Option<MacroRatios>) {
        debug!(?ratios, "macro split replaced");
        self.form.macro_ratios = ratios;
        self.error = None;
        self.persist();
    }

    /// Apply every pending ratio event in order. Each one overwrites the
    /// split, so the last event wins. Returns how many were applied.
    pub fn pump_ratios(&mut self, events: &RatioReceiver) -> usize {
        let pending = events.drain();
        let count = pending.len();
        for event in pending {
            self.update_ratios(event);
        }
        count
    }

    /// Validate the current step and move forward, or submit on the last
    /// step.
    pub fn next(&mut self) -> Transition {
        let descriptor = self.current_descriptor();
        if let ValidationResult::Invalid(message) = descriptor.validate(&self.form) {
            debug!(step = self.step, field = %descriptor.field(), %message, "step rejected");
            self.error = Some(message.clone());
            return Transition::Blocked { message };
        }

        if self.is_last_step() {
            if self.form.macro_ratios.is_none() {
                self.error = Some(RATIO_GATE_MESSAGE.to_string());
                return Transition::Blocked {
                    message: RATIO_GATE_MESSAGE.to_string(),
                };
            }
            info!(steps = self.catalog.len(), "intake submitted");
            if let Some(handler) = self.on_submit.as_mut() {
                handler(&self.form);
            }
            return Transition::Submitted(self.form.clone());
        }

        self.step += 1;
        self.error = None;
        self.persist();
        debug!(step = self.step, "advanced");
        Transition::Advanced { step: self.step }
    }

    /// Move back one step without validating. Stays on the first step.
    pub fn previous(&mut self) -> usize {
        if self.step == 0 {
            warn!("previous requested on the first step, ignoring");
        } else {
            self.step -= 1;
        }
        self.error = None;
        self.persist();
        self.step
    }

    /// Forget all progress: delete the stored snapshot and return to the
    /// first step with default answers. Nothing is written back until the
    /// next committed change.
    pub fn reset(&mut self) -> bool {
        let cleared = self.store.clear();
        self.step = 0;
        self.form = FormData::default();
        self.error = None;
        info!(cleared, "wizard reset");
        cleared
    }

    fn persist(&self) {
        self.store.save(&self.snapshot());
    }
}

impl<K: KeyValueSlot> fmt::Debug for WizardController<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("step", &self.step)
            .field("steps", &self.catalog.len())
            .field("error", &self.error)
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}
