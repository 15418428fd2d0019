//! Step validators.
//!
//! A step may carry one validator, run against the value of the step's field
//! when the user presses Next. Built-ins cover the intake form:
//! - [`Required`] for answers that must not be left empty
//! - [`IntegerRange`] for age, weight and height bounds
//! - [`RatiosPresent`] for the macro split
//! - [`Custom`] for anything else

use crate::form::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of running a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation passed.
    Valid,
    /// Validation failed with an error message.
    Invalid(String),
}

impl ValidationResult {
    /// Check if validation passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if validation failed.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Get the error message if invalid.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Invalid(msg) => Some(msg),
            Self::Valid => None,
        }
    }
}

/// A validator for one step's field value.
pub trait StepValidator: Send + Sync {
    /// Validate the given value.
    fn validate(&self, value: &FieldValue) -> ValidationResult;

    /// Get the name of this validator.
    fn name(&self) -> &str;
}

/// Required answer validator.
#[derive(Debug, Clone)]
pub struct Required {
    message: String,
}

impl Required {
    /// Create a required validator with default message.
    pub fn new() -> Self {
        Self {
            message: "This field is required".to_string(),
        }
    }

    /// Create with custom message.
    pub fn with_message(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl StepValidator for Required {
    fn validate(&self, value: &FieldValue) -> ValidationResult {
        let missing = match value {
            FieldValue::Age(e) | FieldValue::Weight(e) | FieldValue::Height(e) => e.is_blank(),
            FieldValue::MacroRatios(r) => r.is_none(),
            _ => false,
        };
        if missing {
            ValidationResult::Invalid(self.message.clone())
        } else {
            ValidationResult::Valid
        }
    }

    fn name(&self) -> &'static str {
        "required"
    }
}

/// Inclusive integer bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lowest accepted value
    pub min: i64,
    /// Highest accepted value
    pub max: i64,
}

impl Bounds {
    /// Create bounds.
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check a value against the bounds.
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Integer range validator for the numeric entries.
///
/// Blank and unparsable entries fail with the same message as out-of-range
/// ones, so the user always sees the accepted range.
#[derive(Debug, Clone)]
pub struct IntegerRange {
    bounds: Bounds,
    message: String,
}

impl IntegerRange {
    /// Create a range validator.
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            bounds: Bounds::new(min, max),
            message: format!("Must be between {min} and {max}"),
        }
    }

    /// Create with custom message.
    pub fn with_message(min: i64, max: i64, message: &str) -> Self {
        Self {
            bounds: Bounds::new(min, max),
            message: message.to_string(),
        }
    }

    /// Accepted bounds.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl StepValidator for IntegerRange {
    fn validate(&self, value: &FieldValue) -> ValidationResult {
        let parsed = match value {
            FieldValue::Percentage(p) => Some(i64::from(*p)),
            other => other.as_entry().and_then(|e| e.as_integer()),
        };
        match parsed {
            Some(n) if self.bounds.contains(n) => ValidationResult::Valid,
            _ => ValidationResult::Invalid(self.message.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "integerRange"
    }
}

/// Macro split validator: the sliders must have produced a split.
#[derive(Debug, Clone)]
pub struct RatiosPresent {
    message: String,
}

impl RatiosPresent {
    /// Create with the default message.
    pub fn new() -> Self {
        Self {
            message: "Please set valid macro ratios that total 100%".to_string(),
        }
    }

    /// Create with custom message.
    pub fn with_message(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Default for RatiosPresent {
    fn default() -> Self {
        Self::new()
    }
}

impl StepValidator for RatiosPresent {
    fn validate(&self, value: &FieldValue) -> ValidationResult {
        match value {
            FieldValue::MacroRatios(Some(_)) => ValidationResult::Valid,
            _ => ValidationResult::Invalid(self.message.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "ratios"
    }
}

/// Custom function validator.
pub struct Custom<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    validator: F,
    name: String,
}

impl<F> Custom<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    /// Create a custom validator.
    pub fn new(name: &str, validator: F) -> Self {
        Self {
            validator,
            name: name.to_string(),
        }
    }
}

impl<F> StepValidator for Custom<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    fn validate(&self, value: &FieldValue) -> ValidationResult {
        (self.validator)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for Custom<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Entry, Gender, MacroRatios};

    fn age(text: &str) -> FieldValue {
        FieldValue::Age(Entry::from(text))
    }

    #[test]
    fn test_validation_result_valid() {
        let result = ValidationResult::Valid;
        assert!(result.is_valid());
        assert!(!result.is_invalid());
        assert_eq!(result.error(), None);
    }

    #[test]
    fn test_validation_result_invalid() {
        let result = ValidationResult::Invalid("bad".to_string());
        assert!(!result.is_valid());
        assert!(result.is_invalid());
        assert_eq!(result.error(), Some("bad"));
    }

    #[test]
    fn test_required_validator() {
        let v = Required::new();
        assert!(v.validate(&age("")).is_invalid());
        assert!(v.validate(&age("20")).is_valid());
        assert!(v.validate(&FieldValue::MacroRatios(None)).is_invalid());
        assert!(v.validate(&FieldValue::Gender(Gender::Female)).is_valid());
        assert_eq!(v.name(), "required");
    }

    #[test]
    fn test_required_custom_message() {
        let v = Required::with_message("Tell us your weight");
        assert_eq!(
            v.validate(&FieldValue::Weight(Entry::default())).error(),
            Some("Tell us your weight")
        );
    }

    #[test]
    fn test_integer_range_validator() {
        let v = IntegerRange::with_message(19, 100, "Age must be between 19 and 100");
        assert!(v.validate(&age("19")).is_valid());
        assert!(v.validate(&age("100")).is_valid());
        assert!(v.validate(&age("18")).is_invalid());
        assert!(v.validate(&age("101")).is_invalid());
        assert_eq!(
            v.validate(&age("")).error(),
            Some("Age must be between 19 and 100")
        );
    }

    #[test]
    fn test_integer_range_unparsable_is_invalid() {
        let v = IntegerRange::new(30, 200);
        assert_eq!(
            v.validate(&FieldValue::Weight(Entry::from("heavy"))).error(),
            Some("Must be between 30 and 200")
        );
    }

    #[test]
    fn test_integer_range_truncates_like_parse_int() {
        let v = IntegerRange::new(135, 200);
        assert!(v.validate(&FieldValue::Height(Entry::from("199.9"))).is_valid());
        assert!(v.validate(&FieldValue::Height(Entry::Number(200.7))).is_valid());
        assert!(v.validate(&FieldValue::Height(Entry::from("134.9"))).is_invalid());
    }

    #[test]
    fn test_integer_range_percentage() {
        let v = IntegerRange::new(75, 125);
        assert!(v.validate(&FieldValue::Percentage(100)).is_valid());
        assert!(v.validate(&FieldValue::Percentage(130)).is_invalid());
    }

    #[test]
    fn test_integer_range_rejects_non_numeric_fields() {
        let v = IntegerRange::new(0, 10);
        assert!(v.validate(&FieldValue::Gender(Gender::Male)).is_invalid());
    }

    #[test]
    fn test_ratios_present() {
        let v = RatiosPresent::new();
        assert_eq!(
            v.validate(&FieldValue::MacroRatios(None)).error(),
            Some("Please set valid macro ratios that total 100%")
        );
        assert!(v
            .validate(&FieldValue::MacroRatios(Some(MacroRatios::DEFAULT)))
            .is_valid());
    }

    #[test]
    fn test_custom_validator() {
        let v = Custom::new("lightweight", |value: &FieldValue| match value {
            FieldValue::Activity(a) if *a > 2.4 => {
                ValidationResult::Invalid("Activity tops out at 2.4".to_string())
            }
            _ => ValidationResult::Valid,
        });
        assert_eq!(v.name(), "lightweight");
        assert!(v.validate(&FieldValue::Activity(1.4)).is_valid());
        assert!(v.validate(&FieldValue::Activity(3.0)).is_invalid());
        assert!(format!("{v:?}").contains("lightweight"));
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(30, 200);
        assert!(b.contains(30));
        assert!(b.contains(200));
        assert!(!b.contains(29));
        assert!(!b.contains(201));
    }
}
