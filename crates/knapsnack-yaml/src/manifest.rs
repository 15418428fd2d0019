//! Manifest types for the intake wizard.

use crate::error::ParseError;
use knapsnack_core::{
    FieldKey, IntakeLimits, IntegerRange, Limit, RatiosPresent, Required, StepCatalog,
    StepDescriptor, DEFAULT_STORAGE_KEY,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Manifest format version written by [`Manifest::standard`].
pub const MANIFEST_VERSION: &str = "0.1";

fn default_version() -> String {
    MANIFEST_VERSION.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Wizard manifest loaded from `intake.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    #[serde(default = "default_version")]
    pub knapsnack: String,
    /// Key the snapshot is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Measurement limits referenced by `limit` validators
    #[serde(default)]
    pub limits: IntakeLimits,
    /// Ordered wizard steps
    pub steps: Vec<StepConfig>,
}

/// One wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Form field the step edits
    pub field: FieldKey,
    /// Prompt shown for the step
    pub title: String,
    /// Validator run on Next
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<ValidatorConfig>,
}

/// Validator declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorConfig {
    /// Answer must not be left empty
    Required {
        /// Custom message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Integer within inclusive bounds
    Range {
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
        /// Custom message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Integer within one of the manifest's named limits
    Limit {
        /// Which limit applies
        limit: Limit,
    },
    /// Macro sliders must total 100
    Ratios {
        /// Custom message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ValidatorConfig {
    fn attach(&self, step: StepDescriptor, limits: &IntakeLimits) -> StepDescriptor {
        match self {
            Self::Required { message: None } => step.with_validator(Required::new()),
            Self::Required { message: Some(m) } => step.with_validator(Required::with_message(m)),
            Self::Range {
                min,
                max,
                message: None,
            } => step.with_validator(IntegerRange::new(*min, *max)),
            Self::Range {
                min,
                max,
                message: Some(m),
            } => step.with_validator(IntegerRange::with_message(*min, *max, m)),
            Self::Limit { limit } => step.with_validator(limit.validator(limits)),
            Self::Ratios { message: None } => step.with_validator(RatiosPresent::new()),
            Self::Ratios { message: Some(m) } => {
                step.with_validator(RatiosPresent::with_message(m))
            }
        }
    }
}

impl Manifest {
    /// Parse a manifest from YAML and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the manifest is unusable.
    pub fn from_yaml(yaml: &str) -> Result<Self, ParseError> {
        let manifest: Self = serde_yaml_ng::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serialize manifest to YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ParseError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// The eight-step intake with the default limits.
    pub fn standard() -> Self {
        let step = |field, title: &str, validate| StepConfig {
            field,
            title: title.to_string(),
            validate,
        };
        let limit = |limit| Some(ValidatorConfig::Limit { limit });
        Self {
            knapsnack: default_version(),
            storage_key: default_storage_key(),
            limits: IntakeLimits::default(),
            steps: vec![
                step(FieldKey::Gender, "First, what's your gender?", None),
                step(FieldKey::Age, "How old are you?", limit(Limit::Age)),
                step(
                    FieldKey::Weight,
                    "What's your weight in kilograms?",
                    limit(Limit::Weight),
                ),
                step(
                    FieldKey::Height,
                    "And your height in centimeters?",
                    limit(Limit::Height),
                ),
                step(
                    FieldKey::Activity,
                    "How active are you on a daily basis?",
                    None,
                ),
                step(FieldKey::SmokingStatus, "Do you smoke?", None),
                step(FieldKey::Percentage, "What's your caloric goal?", None),
                step(
                    FieldKey::MacroRatios,
                    "Finally, let's set your macro ratios",
                    None,
                ),
            ],
        }
    }

    /// Check the manifest describes a wizard that can be completed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.storage_key.trim().is_empty() {
            return Err(ParseError::InvalidValue {
                field: "storage_key".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.steps.is_empty() {
            return Err(ParseError::Validation(
                "manifest must declare at least one step".to_string(),
            ));
        }

        for (name, bounds) in [
            ("age", self.limits.age),
            ("weight", self.limits.weight),
            ("height", self.limits.height),
        ] {
            if bounds.min > bounds.max {
                return Err(ParseError::InvalidValue {
                    field: format!("limits.{name}"),
                    message: format!("min {} exceeds max {}", bounds.min, bounds.max),
                });
            }
        }

        let mut seen = HashSet::new();
        for (i, step) in self.steps.iter().enumerate() {
            if !seen.insert(step.field) {
                return Err(ParseError::InvalidValue {
                    field: format!("steps[{i}].field"),
                    message: format!("'{}' is already edited by an earlier step", step.field),
                });
            }
            if let Some(ValidatorConfig::Range { min, max, .. }) = &step.validate {
                if min > max {
                    return Err(ParseError::InvalidValue {
                        field: format!("steps[{i}].validate"),
                        message: format!("min {min} exceeds max {max}"),
                    });
                }
            }
        }

        if !seen.contains(&FieldKey::MacroRatios) {
            return Err(ParseError::Validation(
                "no step edits macroRatios, so the wizard could never submit".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the step catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest has no steps.
    pub fn catalog(&self) -> Result<StepCatalog, ParseError> {
        let steps = self
            .steps
            .iter()
            .map(|config| {
                let step = StepDescriptor::new(config.field, config.title.clone());
                match &config.validate {
                    Some(validator) => validator.attach(step, &self.limits),
                    None => step,
                }
            })
            .collect();
        Ok(StepCatalog::new(steps)?)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::standard()
    }
}
