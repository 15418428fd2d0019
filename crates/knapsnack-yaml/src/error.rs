//! Error types for manifest parsing.

use knapsnack_core::CatalogError;
use thiserror::Error;

/// Error type for manifest parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Error message
        message: String,
    },
    /// The steps do not form a usable catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = ParseError::Validation("no steps".to_string());
        assert_eq!(err.to_string(), "Validation error: no steps");
    }

    #[test]
    fn test_error_display_invalid_value() {
        let err = ParseError::InvalidValue {
            field: "steps[1].validate".to_string(),
            message: "min 10 exceeds max 5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'steps[1].validate': min 10 exceeds max 5"
        );
    }

    #[test]
    fn test_error_from_catalog() {
        let err: ParseError = CatalogError::Empty.into();
        assert!(matches!(err, ParseError::Catalog(CatalogError::Empty)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_from_yaml() {
        let yaml_err = serde_yaml_ng::from_str::<u32>("[").unwrap_err();
        let err: ParseError = yaml_err.into();
        assert!(err.to_string().starts_with("YAML error:"));
    }
}
