//! Step catalog: the ordered pages of the wizard.
//!
//! Every step names the form field it edits. Validation on Next looks the
//! field up by that key, so reordering steps never desynchronizes a
//! validator from its value.

use crate::error::CatalogError;
use crate::form::{FieldKey, FormData};
use crate::validation::{Bounds, IntegerRange, StepValidator, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted ranges for the body measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeLimits {
    /// Age in years
    #[serde(default = "default_age")]
    pub age: Bounds,
    /// Weight in kilograms
    #[serde(default = "default_weight")]
    pub weight: Bounds,
    /// Height in centimeters
    #[serde(default = "default_height")]
    pub height: Bounds,
}

const fn default_age() -> Bounds {
    Bounds::new(19, 100)
}

const fn default_weight() -> Bounds {
    Bounds::new(30, 200)
}

const fn default_height() -> Bounds {
    Bounds::new(135, 200)
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            age: default_age(),
            weight: default_weight(),
            height: default_height(),
        }
    }
}

/// A named measurement limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// Age bounds
    Age,
    /// Weight bounds
    Weight,
    /// Height bounds
    Height,
}

impl Limit {
    /// Bounds for this limit.
    pub const fn bounds(self, limits: &IntakeLimits) -> Bounds {
        match self {
            Self::Age => limits.age,
            Self::Weight => limits.weight,
            Self::Height => limits.height,
        }
    }

    /// Message shown when a value falls outside the bounds.
    pub fn message(self, limits: &IntakeLimits) -> String {
        let Bounds { min, max } = self.bounds(limits);
        match self {
            Self::Age => format!("Age must be between {min} and {max}"),
            Self::Weight => format!("Weight must be between {min} and {max} kg"),
            Self::Height => format!("Height must be between {min} and {max} cm"),
        }
    }

    /// Range validator enforcing this limit.
    pub fn validator(self, limits: &IntakeLimits) -> IntegerRange {
        let Bounds { min, max } = self.bounds(limits);
        IntegerRange::with_message(min, max, &self.message(limits))
    }
}

/// One page of the wizard.
pub struct StepDescriptor {
    field: FieldKey,
    title: String,
    validator: Option<Box<dyn StepValidator>>,
}

impl StepDescriptor {
    /// Create a step editing `field`.
    pub fn new(field: FieldKey, title: impl Into<String>) -> Self {
        Self {
            field,
            title: title.into(),
            validator: None,
        }
    }

    /// Attach the validator run on Next.
    #[must_use]
    pub fn with_validator(mut self, validator: impl StepValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Field this step edits.
    pub const fn field(&self) -> FieldKey {
        self.field
    }

    /// Prompt shown for the step.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The step's validator, if any.
    pub fn validator(&self) -> Option<&dyn StepValidator> {
        self.validator.as_deref()
    }

    /// Run the validator against the step's field in `form`.
    pub fn validate(&self, form: &FormData) -> ValidationResult {
        match &self.validator {
            Some(v) => v.validate(&form.get(self.field)),
            None => ValidationResult::Valid,
        }
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("field", &self.field)
            .field("title", &self.title)
            .field("validator", &self.validator.as_ref().map(|v| v.name()))
            .finish()
    }
}

/// Ordered, non-empty sequence of steps.
#[derive(Debug)]
pub struct StepCatalog {
    steps: Vec<StepDescriptor>,
}

impl StepCatalog {
    /// Build a catalog. At least one step is required.
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { steps })
    }

    /// The eight-step intake: gender, age, weight, height, activity, smoking
    /// status, caloric goal, macro ratios.
    pub fn standard(limits: &IntakeLimits) -> Self {
        Self {
            steps: vec![
                StepDescriptor::new(FieldKey::Gender, "First, what's your gender?"),
                StepDescriptor::new(FieldKey::Age, "How old are you?")
                    .with_validator(Limit::Age.validator(limits)),
                StepDescriptor::new(FieldKey::Weight, "What's your weight in kilograms?")
                    .with_validator(Limit::Weight.validator(limits)),
                StepDescriptor::new(FieldKey::Height, "And your height in centimeters?")
                    .with_validator(Limit::Height.validator(limits)),
                StepDescriptor::new(FieldKey::Activity, "How active are you on a daily basis?"),
                StepDescriptor::new(FieldKey::SmokingStatus, "Do you smoke?"),
                StepDescriptor::new(FieldKey::Percentage, "What's your caloric goal?"),
                StepDescriptor::new(FieldKey::MacroRatios, "Finally, let's set your macro ratios"),
            ],
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the catalog has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    pub fn get(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    /// Step at `index`, or the last step when `index` runs past the end.
    pub fn at(&self, index: usize) -> &StepDescriptor {
        &self.steps[index.min(self.last_index())]
    }

    /// Index of the final step.
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Iterate over the steps in order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::standard(&IntakeLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Entry, MacroRatios};

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(StepCatalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn test_standard_catalog_order() {
        let catalog = StepCatalog::default();
        let fields: Vec<FieldKey> = catalog.iter().map(StepDescriptor::field).collect();
        assert_eq!(
            fields,
            vec![
                FieldKey::Gender,
                FieldKey::Age,
                FieldKey::Weight,
                FieldKey::Height,
                FieldKey::Activity,
                FieldKey::SmokingStatus,
                FieldKey::Percentage,
                FieldKey::MacroRatios,
            ]
        );
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.last_index(), 7);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_standard_validators_follow_field_keys() {
        let catalog = StepCatalog::default();
        let mut form = FormData::default();

        let age_step = catalog.get(1).unwrap();
        assert_eq!(
            age_step.validate(&form).error(),
            Some("Age must be between 19 and 100")
        );
        form.age = Entry::from("40");
        assert!(age_step.validate(&form).is_valid());

        // Smoking status sits before the caloric goal in the catalog but
        // after it in the form record; it must still validate its own field.
        let smoking_step = catalog.get(5).unwrap();
        assert_eq!(smoking_step.field(), FieldKey::SmokingStatus);
        assert!(smoking_step.validator().is_none());

        // Null ratios on the last step are left to the submission gate.
        let ratio_step = catalog.get(7).unwrap();
        assert!(ratio_step.validator().is_none());
        form.macro_ratios = Some(MacroRatios::DEFAULT);
        assert!(ratio_step.validate(&form).is_valid());
    }

    #[test]
    fn test_custom_limits_change_messages() {
        let limits = IntakeLimits {
            weight: Bounds::new(40, 150),
            ..IntakeLimits::default()
        };
        assert_eq!(
            Limit::Weight.message(&limits),
            "Weight must be between 40 and 150 kg"
        );
        assert_eq!(
            Limit::Height.message(&limits),
            "Height must be between 135 and 200 cm"
        );
        let catalog = StepCatalog::standard(&limits);
        let mut form = FormData::default();
        form.weight = Entry::from("35");
        assert!(catalog.get(2).unwrap().validate(&form).is_invalid());
    }

    #[test]
    fn test_limits_deserialize_partial() {
        let limits: IntakeLimits =
            serde_json::from_str(r#"{"age": {"min": 21, "max": 90}}"#).unwrap();
        assert_eq!(limits.age, Bounds::new(21, 90));
        assert_eq!(limits.weight, Bounds::new(30, 200));
        assert_eq!(limits.height, Bounds::new(135, 200));
    }

    #[test]
    fn test_descriptor_debug_names_validator() {
        let step = StepDescriptor::new(FieldKey::Age, "Age?")
            .with_validator(Limit::Age.validator(&IntakeLimits::default()));
        let debug = format!("{step:?}");
        assert!(debug.contains("integerRange"));
        assert!(debug.contains("Age?"));
    }
}
