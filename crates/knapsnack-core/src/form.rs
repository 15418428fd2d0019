//! Intake form model.
//!
//! [`FormData`] is the record the wizard accumulates. Its JSON shape is the
//! `data` half of a persisted snapshot, so field names follow the browser
//! convention (`macroRatios`, `smokingStatus`).

use crate::error::FormError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    /// Male (`"m"`)
    #[default]
    #[serde(rename = "m")]
    Male,
    /// Female (`"f"`)
    #[serde(rename = "f")]
    Female,
}

/// Smoking status. Smokers need an extra 35 mg of vitamin C per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmokingStatus {
    /// Smoker
    #[serde(rename = "yes")]
    Yes,
    /// Non-smoker
    #[default]
    #[serde(rename = "no")]
    No,
}

/// A numeric field exactly as the user entered it.
///
/// Browsers hand number inputs over as strings, while older snapshots may hold
/// real numbers, so both shapes are accepted. An empty string means "not yet
/// answered".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// JSON number
    Number(f64),
    /// Raw text
    Text(String),
}

impl Default for Entry {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Entry {
    /// True for an unanswered (empty) entry.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(_) => false,
        }
    }

    /// False only for a NaN or infinite number.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            Self::Text(_) => true,
        }
    }

    /// Integer value with `parseInt` semantics: leading whitespace is skipped,
    /// an optional sign and the leading run of digits are read, anything after
    /// is ignored. Returns `None` when no digits lead the text.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Self::Number(_) => None,
            Self::Text(s) => {
                let s = s.trim_start();
                let (negative, rest) = match s.as_bytes().first() {
                    Some(b'-') => (true, &s[1..]),
                    Some(b'+') => (false, &s[1..]),
                    _ => (false, s),
                };
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    return None;
                }
                let value = digits.parse::<i64>().ok()?;
                Some(if negative { -value } else { value })
            }
        }
    }
}

impl From<&str> for Entry {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Entry {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Entry {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Protein/carbohydrate/fat split of daily calories, in percent.
///
/// A `MacroRatios` value always totals exactly 100; the only way to build one
/// is through [`MacroRatios::new`] or deserialization, and both check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRatios")]
pub struct MacroRatios {
    protein: u8,
    carbohydrate: u8,
    fats: u8,
}

#[derive(Deserialize)]
struct RawRatios {
    protein: u8,
    #[serde(alias = "carbs")]
    carbohydrate: u8,
    #[serde(alias = "fat")]
    fats: u8,
}

impl TryFrom<RawRatios> for MacroRatios {
    type Error = String;

    fn try_from(raw: RawRatios) -> Result<Self, Self::Error> {
        Self::new(raw.protein, raw.carbohydrate, raw.fats).ok_or_else(|| {
            format!(
                "macro ratios must total 100, got {}",
                u16::from(raw.protein) + u16::from(raw.carbohydrate) + u16::from(raw.fats)
            )
        })
    }
}

impl MacroRatios {
    /// Starting split offered by the ratio sliders.
    pub const DEFAULT: Self = Self {
        protein: 30,
        carbohydrate: 40,
        fats: 30,
    };

    /// Build a split, or `None` unless the three shares total exactly 100.
    pub fn new(protein: u8, carbohydrate: u8, fats: u8) -> Option<Self> {
        let total = u16::from(protein) + u16::from(carbohydrate) + u16::from(fats);
        (total == 100).then_some(Self {
            protein,
            carbohydrate,
            fats,
        })
    }

    /// Protein share.
    pub const fn protein(&self) -> u8 {
        self.protein
    }

    /// Carbohydrate share.
    pub const fn carbohydrate(&self) -> u8 {
        self.carbohydrate
    }

    /// Fat share.
    pub const fn fats(&self) -> u8 {
        self.fats
    }
}

impl fmt::Display for MacroRatios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "protein {}% / carbohydrate {}% / fats {}%",
            self.protein, self.carbohydrate, self.fats
        )
    }
}

/// Names of the form fields, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    /// `gender`
    Gender,
    /// `age`
    Age,
    /// `weight`
    Weight,
    /// `height`
    Height,
    /// `activity`
    Activity,
    /// `percentage`
    Percentage,
    /// `macroRatios`
    MacroRatios,
    /// `smokingStatus`
    SmokingStatus,
}

impl FieldKey {
    /// Every field, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Gender,
        Self::Age,
        Self::Weight,
        Self::Height,
        Self::Activity,
        Self::Percentage,
        Self::MacroRatios,
        Self::SmokingStatus,
    ];

    /// JSON name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Activity => "activity",
            Self::Percentage => "percentage",
            Self::MacroRatios => "macroRatios",
            Self::SmokingStatus => "smokingStatus",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// A typed value for one field. The variant names the field it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Value for `gender`
    Gender(Gender),
    /// Value for `age`
    Age(Entry),
    /// Value for `weight`
    Weight(Entry),
    /// Value for `height`
    Height(Entry),
    /// Value for `activity`
    Activity(f64),
    /// Value for `percentage`
    Percentage(u16),
    /// Value for `macroRatios`
    MacroRatios(Option<MacroRatios>),
    /// Value for `smokingStatus`
    SmokingStatus(SmokingStatus),
}

impl FieldValue {
    /// The field this value is for.
    pub const fn key(&self) -> FieldKey {
        match self {
            Self::Gender(_) => FieldKey::Gender,
            Self::Age(_) => FieldKey::Age,
            Self::Weight(_) => FieldKey::Weight,
            Self::Height(_) => FieldKey::Height,
            Self::Activity(_) => FieldKey::Activity,
            Self::Percentage(_) => FieldKey::Percentage,
            Self::MacroRatios(_) => FieldKey::MacroRatios,
            Self::SmokingStatus(_) => FieldKey::SmokingStatus,
        }
    }

    /// The raw entry, for the free-text numeric fields.
    pub const fn as_entry(&self) -> Option<&Entry> {
        match self {
            Self::Age(e) | Self::Weight(e) | Self::Height(e) => Some(e),
            _ => None,
        }
    }

    /// Check the value survives a JSON round trip. Non-finite numbers
    /// serialize as `null`, which would make the saved snapshot unreadable.
    pub fn ensure_finite(&self) -> Result<(), FormError> {
        let finite = match self {
            Self::Age(e) | Self::Weight(e) | Self::Height(e) => e.is_finite(),
            Self::Activity(v) => v.is_finite(),
            _ => true,
        };
        if finite {
            Ok(())
        } else {
            Err(FormError::InvalidValue {
                field: self.key(),
                message: "number must be finite".to_string(),
            })
        }
    }

    /// Decode a JSON value for `key`.
    pub fn from_json(key: FieldKey, value: serde_json::Value) -> Result<Self, FormError> {
        fn decode<T: serde::de::DeserializeOwned>(
            key: FieldKey,
            value: serde_json::Value,
        ) -> Result<T, FormError> {
            serde_json::from_value(value).map_err(|e| FormError::InvalidValue {
                field: key,
                message: e.to_string(),
            })
        }

        Ok(match key {
            FieldKey::Gender => Self::Gender(decode(key, value)?),
            FieldKey::Age => Self::Age(decode(key, value)?),
            FieldKey::Weight => Self::Weight(decode(key, value)?),
            FieldKey::Height => Self::Height(decode(key, value)?),
            FieldKey::Activity => Self::Activity(decode(key, value)?),
            FieldKey::Percentage => Self::Percentage(decode(key, value)?),
            FieldKey::MacroRatios => Self::MacroRatios(decode(key, value)?),
            FieldKey::SmokingStatus => Self::SmokingStatus(decode(key, value)?),
        })
    }
}

/// Everything the intake wizard collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    /// Gender
    pub gender: Gender,
    /// Age in years
    pub age: Entry,
    /// Weight in kilograms
    pub weight: Entry,
    /// Height in centimeters
    pub height: Entry,
    /// Physical activity multiplier
    pub activity: f64,
    /// Caloric goal as a percentage of maintenance
    pub percentage: u16,
    /// Macro split, `None` until the sliders total 100
    pub macro_ratios: Option<MacroRatios>,
    /// Smoking status
    pub smoking_status: SmokingStatus,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: Entry::default(),
            weight: Entry::default(),
            height: Entry::default(),
            activity: 1.2,
            percentage: 100,
            macro_ratios: None,
            smoking_status: SmokingStatus::No,
        }
    }
}

impl FormData {
    /// Current value of a field.
    pub fn get(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::Gender => FieldValue::Gender(self.gender),
            FieldKey::Age => FieldValue::Age(self.age.clone()),
            FieldKey::Weight => FieldValue::Weight(self.weight.clone()),
            FieldKey::Height => FieldValue::Height(self.height.clone()),
            FieldKey::Activity => FieldValue::Activity(self.activity),
            FieldKey::Percentage => FieldValue::Percentage(self.percentage),
            FieldKey::MacroRatios => FieldValue::MacroRatios(self.macro_ratios),
            FieldKey::SmokingStatus => FieldValue::SmokingStatus(self.smoking_status),
        }
    }

    /// Replace one field. Non-finite numbers are rejected and leave the
    /// record unchanged.
    pub fn set(&mut self, value: FieldValue) -> Result<(), FormError> {
        value.ensure_finite()?;
        match value {
            FieldValue::Gender(v) => self.gender = v,
            FieldValue::Age(v) => self.age = v,
            FieldValue::Weight(v) => self.weight = v,
            FieldValue::Height(v) => self.height = v,
            FieldValue::Activity(v) => self.activity = v,
            FieldValue::Percentage(v) => self.percentage = v,
            FieldValue::MacroRatios(v) => self.macro_ratios = v,
            FieldValue::SmokingStatus(v) => self.smoking_status = v,
        }
        Ok(())
    }
}
