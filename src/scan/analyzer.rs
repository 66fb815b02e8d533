use std::path::Path;

use async_trait::async_trait;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::Result;
use crate::models::{CardDraft, Condition, ConditionGrade};

/// What the vision model read off one card photo
///
/// Fields the model left out stay `None`; they fail card validation later
/// and the image is counted as failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAnalysis {
    pub player_name: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub manufacturer: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub is_rookie_card: bool,
    pub is_autograph: bool,
    pub is_memorabilia: bool,
    pub condition: Option<Condition>,
    pub estimated_value: f64,
    /// Model confidence, clamped to 0..=1
    pub confidence: f64,
}

/// Something that can label card photos
#[async_trait]
pub trait CardImageAnalyzer: Send + Sync {
    /// Whether the backing service answers at all
    async fn test_connection(&self) -> bool;

    /// Reads one card photo
    ///
    /// ### Errors
    ///
    /// Transport failures and error statuses; unparseable model output is
    /// not an error and yields [`CardAnalysis::fallback`].
    async fn analyze(&self, image: &Path) -> Result<CardAnalysis>;
}

impl CardAnalysis {
    /// The low-confidence placeholder used when the model's answer is not JSON
    pub fn fallback() -> Self {
        Self {
            player_name: Some("Unknown Player".to_string()),
            sport: Some("Unknown".to_string()),
            year: Some(chrono::Utc::now().year()),
            manufacturer: Some("Unknown".to_string()),
            set_name: Some("Unknown Set".to_string()),
            card_number: Some("1".to_string()),
            is_rookie_card: false,
            is_autograph: false,
            is_memorabilia: false,
            condition: Some(Condition::default()),
            estimated_value: 1.0,
            confidence: 0.1,
        }
    }

    /// Parses free-form model output
    ///
    /// Takes the text between the first `{` and the last `}` and reads it
    /// leniently: numbers and booleans may arrive as strings, condition
    /// scores are clamped to 1..=10 and an unknown grade reads as `Good`.
    pub fn from_model_output(text: &str) -> Self {
        let text = text.trim();
        let json = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if end > start => &text[start..=end],
            _ => text,
        };

        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            Ok(other) => {
                warn!("Model returned JSON that is not an object: {}", other);
                Self::fallback()
            }
            Err(e) => {
                warn!("Failed to parse model output as JSON: {}", e);
                Self::fallback()
            }
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            player_name: text_field(fields, "playerName"),
            sport: text_field(fields, "sport"),
            year: number_field(fields, "year").map(|y| y.round() as i32),
            manufacturer: text_field(fields, "manufacturer"),
            set_name: text_field(fields, "setName"),
            card_number: text_field(fields, "cardNumber"),
            is_rookie_card: bool_field(fields, "isRookieCard"),
            is_autograph: bool_field(fields, "isAutograph"),
            is_memorabilia: bool_field(fields, "isMemorabilia"),
            condition: fields.get("condition").and_then(Value::as_object).map(condition_from),
            estimated_value: number_field(fields, "estimatedValue").unwrap_or(0.0),
            confidence: number_field(fields, "confidence").unwrap_or(0.0).clamp(0.0, 1.0),
        }
    }

    /// Turns the analysis into a card draft for a scanned image
    ///
    /// The image doubles as front and back photo, the job name becomes the
    /// lot number and a tag, and the notes record the source folder and
    /// confidence.
    pub fn into_draft(self, image: &Path, job_name: &str, folder: &str) -> CardDraft {
        let image = image.to_string_lossy().to_string();
        CardDraft {
            player_name: self.player_name,
            sport: self.sport,
            year: self.year,
            manufacturer: self.manufacturer,
            set_name: self.set_name,
            card_number: self.card_number,
            front_image: Some(image.clone()),
            back_image: Some(image),
            condition: self.condition,
            is_rookie_card: self.is_rookie_card,
            is_autograph: self.is_autograph,
            is_memorabilia: self.is_memorabilia,
            estimated_value: self.estimated_value,
            market_value: 0.0,
            tags: vec![job_name.to_string(), "scanned".to_string()],
            notes: format!("Scanned from {} with confidence {}", folder, self.confidence),
            lot_number: Some(job_name.to_string()),
            is_for_trade: false,
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn condition_from(fields: &Map<String, Value>) -> Condition {
    let score = |key: &str| {
        number_field(fields, key)
            .map(|n| (n.round() as i32).clamp(1, 10))
            .unwrap_or(5)
    };
    Condition {
        centering: score("centering"),
        corners: score("corners"),
        edges: score("edges"),
        surface: score("surface"),
        overall: fields
            .get("overall")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<ConditionGrade>().ok())
            .unwrap_or(ConditionGrade::Good),
    }
}
