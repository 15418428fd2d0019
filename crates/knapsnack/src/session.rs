//! Wizard session wiring.
//!
//! An [`IntakeSession`] is what a front-end drives: it owns the
//! [`WizardController`] and the [`RatioConstraintEngine`] behind the macro
//! sliders, and keeps the two connected. Whenever the macro step becomes the
//! current step the engine is re-seeded from the saved split and announces
//! its validity, mirroring the sliders being mounted.

use knapsnack_core::{
    Channel, FieldKey, FormData, FormError, KeyValueSlot, PersistenceStore,
    RatioConstraintEngine, RatioEvent, RatioReceiver, StepCatalog, Transition, WizardController,
    WizardView,
};
use knapsnack_yaml::{Manifest, ParseError};
use serde::Serialize;
use tracing::debug;

/// Slider state for the macro step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatioView {
    /// Protein share
    pub protein: u8,
    /// Carbohydrate share
    pub carbohydrate: u8,
    /// Fat share
    pub fats: u8,
    /// Sum of the three shares
    pub total: u16,
}

/// Everything a front-end needs to render the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Wizard state
    #[serde(flatten)]
    pub wizard: WizardView,
    /// Slider state, present only on the macro step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratios: Option<RatioView>,
}

/// A wizard wired to its macro sliders.
#[derive(Debug)]
pub struct IntakeSession<K: KeyValueSlot> {
    wizard: WizardController<K>,
    engine: RatioConstraintEngine,
    events: RatioReceiver,
}

impl<K: KeyValueSlot> IntakeSession<K> {
    /// Wrap a controller. If it resumed on the macro step the sliders are
    /// mounted straight away.
    pub fn new(wizard: WizardController<K>) -> Self {
        let (engine, events) = RatioConstraintEngine::channel(wizard.form_data().macro_ratios);
        let mut session = Self {
            wizard,
            engine,
            events,
        };
        session.mount_if_ratio_step();
        session
    }

    /// Build a session from a catalog, persisting under the default key.
    pub fn with_catalog(catalog: StepCatalog, slot: K) -> Self {
        Self::new(WizardController::new(catalog, PersistenceStore::new(slot)))
    }

    /// Build a session from a manifest.
    pub fn from_manifest(manifest: &Manifest, slot: K) -> Result<Self, ParseError> {
        let catalog = manifest.catalog()?;
        let store = PersistenceStore::with_key(slot, manifest.storage_key.clone());
        Ok(Self::new(WizardController::new(catalog, store)))
    }

    /// Register the handler invoked with the finished form.
    pub fn on_submit<F>(&mut self, handler: F)
    where
        F: FnMut(&FormData) + 'static,
    {
        self.wizard.on_submit(handler);
    }

    /// The underlying controller.
    pub const fn wizard(&self) -> &WizardController<K> {
        &self.wizard
    }

    /// The macro sliders.
    pub const fn engine(&self) -> &RatioConstraintEngine {
        &self.engine
    }

    /// Validate and advance, or submit on the last step.
    pub fn next(&mut self) -> Transition {
        let transition = self.wizard.next();
        if matches!(transition, Transition::Advanced { .. }) {
            self.mount_if_ratio_step();
        }
        transition
    }

    /// Go back one step.
    pub fn previous(&mut self) -> usize {
        let before = self.wizard.current_step();
        let step = self.wizard.previous();
        if step != before {
            self.mount_if_ratio_step();
        }
        step
    }

    /// Apply a JSON-typed edit to one field.
    pub fn edit_field(&mut self, key: &str, value: serde_json::Value) -> Result<(), FormError> {
        self.wizard.edit_field_json(key, value)
    }

    /// Move one slider. The engine's emission is applied to the form before
    /// returning.
    pub fn set_channel(&mut self, channel: &str, value: i64) -> Result<RatioEvent, FormError> {
        let channel: Channel = channel.parse()?;
        let event = self.engine.set_channel(channel, value);
        self.wizard.pump_ratios(&self.events);
        Ok(event)
    }

    /// Render-ready view.
    pub fn view(&self) -> SessionView {
        let wizard = self.wizard.view();
        let ratios = (wizard.field == FieldKey::MacroRatios).then(|| RatioView {
            protein: self.engine.get(Channel::Protein),
            carbohydrate: self.engine.get(Channel::Carbohydrate),
            fats: self.engine.get(Channel::Fats),
            total: self.engine.total(),
        });
        SessionView { wizard, ratios }
    }

    /// Forget all progress and start over.
    pub fn reset(&mut self) -> bool {
        let cleared = self.wizard.reset();
        self.mount_if_ratio_step();
        cleared
    }

    fn mount_if_ratio_step(&mut self) {
        if self.wizard.current_descriptor().field() != FieldKey::MacroRatios {
            return;
        }
        let seed = self.wizard.form_data().macro_ratios;
        self.engine = RatioConstraintEngine::new(seed).with_auto_focus(true);
        self.events = self.engine.connect();
        self.engine.announce();
        let applied = self.wizard.pump_ratios(&self.events);
        debug!(?seed, applied, "macro sliders mounted");
    }
}
