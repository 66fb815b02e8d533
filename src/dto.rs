use serde::{Deserialize, Serialize};

use crate::models::{
    Card, CardDraft, Condition, ScanJobSettings, ScanningSettings, ValidationError, WishlistDraft,
    WishlistPriority,
};

/// Data transfer object for creating or updating a card
///
/// Every field is optional: on create, missing fields take the card defaults
/// (and required ones fail validation); on update, missing fields keep their
/// current value.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDto {
    pub player_name: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub manufacturer: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub condition: Option<Condition>,
    pub is_rookie_card: Option<bool>,
    pub is_autograph: Option<bool>,
    pub is_memorabilia: Option<bool>,
    pub estimated_value: Option<f64>,
    pub market_value: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    /// A blank lot number clears it
    pub lot_number: Option<String>,
    pub is_for_trade: Option<bool>,
}

impl CardDto {
    /// Overlays the fields present in this payload onto `draft`
    pub fn apply_to(self, draft: CardDraft) -> CardDraft {
        CardDraft {
            player_name: self.player_name.or(draft.player_name),
            sport: self.sport.or(draft.sport),
            year: self.year.or(draft.year),
            manufacturer: self.manufacturer.or(draft.manufacturer),
            set_name: self.set_name.or(draft.set_name),
            card_number: self.card_number.or(draft.card_number),
            front_image: self.front_image.or(draft.front_image),
            back_image: self.back_image.or(draft.back_image),
            condition: self.condition.or(draft.condition),
            is_rookie_card: self.is_rookie_card.unwrap_or(draft.is_rookie_card),
            is_autograph: self.is_autograph.unwrap_or(draft.is_autograph),
            is_memorabilia: self.is_memorabilia.unwrap_or(draft.is_memorabilia),
            estimated_value: self.estimated_value.unwrap_or(draft.estimated_value),
            market_value: self.market_value.unwrap_or(draft.market_value),
            tags: self.tags.unwrap_or(draft.tags),
            notes: self.notes.unwrap_or(draft.notes),
            lot_number: self.lot_number.or(draft.lot_number),
            is_for_trade: self.is_for_trade.unwrap_or(draft.is_for_trade),
        }
    }

    /// Builds a fresh draft from this payload alone
    pub fn into_draft(self) -> CardDraft {
        self.apply_to(CardDraft::default())
    }
}

/// Data transfer object for a wishlist item, used for both create and update
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WishlistItemDto {
    pub player_name: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub manufacturer: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub priority: Option<WishlistPriority>,
    pub max_price: Option<f64>,
    pub notes: Option<String>,
    pub price_alerts: Option<bool>,
    pub current_market_price: Option<f64>,
}

impl WishlistItemDto {
    pub fn apply_to(self, draft: WishlistDraft) -> WishlistDraft {
        WishlistDraft {
            player_name: self.player_name.or(draft.player_name),
            sport: self.sport.or(draft.sport),
            year: self.year.or(draft.year),
            manufacturer: self.manufacturer.or(draft.manufacturer),
            set_name: self.set_name.or(draft.set_name),
            card_number: self.card_number.or(draft.card_number),
            priority: self.priority.unwrap_or(draft.priority),
            max_price: self.max_price.or(draft.max_price),
            notes: self.notes.or(draft.notes),
            price_alerts: self.price_alerts.unwrap_or(draft.price_alerts),
            current_market_price: self.current_market_price.or(draft.current_market_price),
        }
    }

    pub fn into_draft(self) -> WishlistDraft {
        self.apply_to(WishlistDraft::default())
    }
}

/// Request body of the wishlist write endpoints: `{"item": {...}}`
#[derive(Serialize, Deserialize, Debug)]
pub struct WishlistRequest {
    pub item: WishlistItemDto,
}

/// Query parameters of `GET /api/cards`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct CardListQuery {
    /// 1-based page number, defaults to 1
    pub page: Option<u32>,
    /// Page size; when absent every matching card is returned
    pub limit: Option<u32>,
    /// Substring matched against player, set, manufacturer and card number
    pub search: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub for_trade: Option<bool>,
}

impl CardListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// The search term, trimmed, or `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn sport_filter(&self) -> Option<&str> {
        self.sport.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One page of cards
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
    pub cards: Vec<Card>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

impl CardPage {
    pub fn new(cards: Vec<Card>, total: i64, page: u32, limit: Option<u32>) -> Self {
        let total_pages = match limit {
            Some(limit) if limit > 0 => (total.max(0) as u64).div_ceil(limit as u64) as u32,
            _ if total > 0 => 1,
            _ => 0,
        };
        Self { cards, total, page, total_pages }
    }
}

/// Number of cards in one sport
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SportCount {
    #[serde(rename = "_id")]
    pub sport: String,
    pub count: i64,
}

/// Number of cards whose estimated value falls in a range
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValueBucket {
    pub range: String,
    pub count: i64,
}

/// Summary of a user's collection
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_cards: i64,
    pub total_value: f64,
    pub recent_cards: Vec<Card>,
    pub recent_additions: i64,
    pub sport_breakdown: Vec<SportCount>,
    pub value_distribution: Vec<ValueBucket>,
}

/// Optional overrides for a scan job's settings
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSettingsDto {
    pub confidence_threshold: Option<f64>,
    pub auto_process: Option<bool>,
    pub image_quality: Option<String>,
}

/// Request body of `POST /api/scan/start`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct StartScanDto {
    pub job_name: Option<String>,
    pub folder_path: Option<String>,
    pub settings: Option<ScanSettingsDto>,
}

/// A scan request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub job_name: String,
    pub folder_path: String,
    pub settings: ScanJobSettings,
}

impl StartScanDto {
    /// Checks the required fields and fills missing settings from `defaults`
    ///
    /// ### Errors
    ///
    /// `Job name is required` / `Folder path is required` when blank, or an
    /// out-of-range confidence threshold.
    pub fn resolve(self, defaults: &ScanningSettings) -> Result<ScanRequest, ValidationError> {
        let job_name = self
            .job_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::Invalid("Job name is required".to_string()))?;
        let folder_path = self
            .folder_path
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::Invalid("Folder path is required".to_string()))?;

        let overrides = self.settings.unwrap_or_default();
        let settings = ScanJobSettings {
            confidence_threshold: overrides
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            auto_process: overrides.auto_process.unwrap_or(defaults.auto_process),
            image_quality: overrides
                .image_quality
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| defaults.image_quality.clone()),
        };
        if !(0.0..=1.0).contains(&settings.confidence_threshold) {
            return Err(ValidationError::OutOfRange {
                field: "confidenceThreshold",
                rule: "between 0 and 1".to_string(),
            });
        }

        Ok(ScanRequest { job_name, folder_path, settings })
    }
}

/// Collection export formats
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Query parameters of `GET /api/settings/export`
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ExportQuery {
    pub format: Option<String>,
}

impl ExportQuery {
    pub fn format(&self) -> Result<ExportFormat, ValidationError> {
        match self.format.as_deref().map(|f| f.trim().to_ascii_lowercase()) {
            None => Ok(ExportFormat::Json),
            Some(f) if f == "json" => Ok(ExportFormat::Json),
            Some(f) if f == "csv" => Ok(ExportFormat::Csv),
            Some(f) => Err(ValidationError::Invalid(format!(
                "Unsupported export format: {}",
                f
            ))),
        }
    }
}

/// Request body of `POST /api/settings/import`
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ImportDto {
    pub cards: Vec<CardDto>,
}

/// Query parameters of the placeholder image route
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceholderQuery {
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub text: Option<String>,
}


#[cfg(test)]
mod prop_tests;
