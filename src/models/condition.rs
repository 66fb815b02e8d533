use std::fmt;
use std::str::FromStr;

use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

use super::json_value::json_text_column;
use super::ValidationError;

/// Overall grading label for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionGrade {
    Poor,
    Fair,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
    #[serde(rename = "Near Mint")]
    NearMint,
    Mint,
    #[serde(rename = "Gem Mint")]
    GemMint,
}

impl ConditionGrade {
    pub const ALL: [ConditionGrade; 8] = [
        ConditionGrade::Poor,
        ConditionGrade::Fair,
        ConditionGrade::Good,
        ConditionGrade::VeryGood,
        ConditionGrade::Excellent,
        ConditionGrade::NearMint,
        ConditionGrade::Mint,
        ConditionGrade::GemMint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionGrade::Poor => "Poor",
            ConditionGrade::Fair => "Fair",
            ConditionGrade::Good => "Good",
            ConditionGrade::VeryGood => "Very Good",
            ConditionGrade::Excellent => "Excellent",
            ConditionGrade::NearMint => "Near Mint",
            ConditionGrade::Mint => "Mint",
            ConditionGrade::GemMint => "Gem Mint",
        }
    }
}

impl fmt::Display for ConditionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionGrade {
    type Err = ValidationError;

    /// Parses a grade label, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ConditionGrade::ALL
            .into_iter()
            .find(|grade| grade.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::Invalid(format!("Unknown condition grade: {}", wanted)))
    }
}

/// Condition sub-scores of a card, each on a 1-10 scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct Condition {
    pub centering: i32,
    pub corners: i32,
    pub edges: i32,
    pub surface: i32,
    pub overall: ConditionGrade,
}

json_text_column!(Condition);

impl Condition {
    /// The score range every sub-score must fall in
    pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

    /// Checks that every sub-score is within 1-10
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scores = [
            ("condition.centering", self.centering),
            ("condition.corners", self.corners),
            ("condition.edges", self.edges),
            ("condition.surface", self.surface),
        ];
        for (field, score) in scores {
            if !Self::SCORE_RANGE.contains(&score) {
                return Err(ValidationError::OutOfRange {
                    field,
                    rule: "between 1 and 10".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            centering: 5,
            corners: 5,
            edges: 5,
            surface: 5,
            overall: ConditionGrade::Good,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_serializes_with_spaces() {
        let json = serde_json::to_string(&ConditionGrade::NearMint).unwrap();
        assert_eq!(json, "\"Near Mint\"");

        let grade: ConditionGrade = serde_json::from_str("\"Gem Mint\"").unwrap();
        assert_eq!(grade, ConditionGrade::GemMint);
    }

    #[test]
    fn test_grade_from_str_is_case_insensitive() {
        assert_eq!("very good".parse::<ConditionGrade>().unwrap(), ConditionGrade::VeryGood);
        assert_eq!("  MINT ".parse::<ConditionGrade>().unwrap(), ConditionGrade::Mint);
        assert!("Pristine".parse::<ConditionGrade>().is_err());
    }

    #[test]
    fn test_condition_validate_rejects_out_of_range() {
        let mut condition = Condition::default();
        assert!(condition.validate().is_ok());

        condition.edges = 11;
        let err = condition.validate().unwrap_err();
        assert_eq!(err.to_string(), "condition.edges must be between 1 and 10");

        condition.edges = 0;
        assert!(condition.validate().is_err());
    }
}
