use thiserror::Error;

/// Reasons a card or wishlist payload is rejected before it reaches the database
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be {rule}")]
    OutOfRange { field: &'static str, rule: String },
    #[error("{0}")]
    Invalid(String),
}

/// Trims a required string field, rejecting empty values
pub(crate) fn require_trimmed(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value)
}

/// Trims an optional string field, mapping blank values to `None`
pub(crate) fn optional_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects negative, NaN or infinite money values
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "a non-negative number".to_string(),
        });
    }
    Ok(value)
}

/// Checks a card year against the range 1800 through next year
pub(crate) fn require_card_year(field: &'static str, year: i32) -> Result<i32, ValidationError> {
    use chrono::Datelike;

    let max_year = chrono::Utc::now().year() + 1;
    if !(1800..=max_year).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field,
            rule: format!("between 1800 and {}", max_year),
        });
    }
    Ok(year)
}
