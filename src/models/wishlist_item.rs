use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{optional_trimmed, require_card_year, require_non_negative, require_trimmed};
use super::ValidationError;

/// How badly the user wants a wishlist card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl WishlistPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishlistPriority::Low => "low",
            WishlistPriority::Medium => "medium",
            WishlistPriority::High => "high",
        }
    }
}

impl fmt::Display for WishlistPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WishlistPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(WishlistPriority::Low),
            "medium" => Ok(WishlistPriority::Medium),
            "high" => Ok(WishlistPriority::High),
            other => Err(ValidationError::Invalid(format!(
                "priority must be one of low, medium, high (got {})",
                other
            ))),
        }
    }
}

/// A card the user is looking for
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::wishlist_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    player_name: String,
    sport: String,
    year: Option<i32>,
    manufacturer: Option<String>,
    set_name: Option<String>,
    card_number: Option<String>,
    /// One of `low`, `medium`, `high`
    priority: String,
    max_price: Option<f64>,
    notes: Option<String>,
    date_added: NaiveDateTime,
    price_alerts: bool,
    current_market_price: Option<f64>,
}

/// The user-editable fields of a wishlist item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WishlistDraft {
    pub player_name: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub manufacturer: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub priority: WishlistPriority,
    pub max_price: Option<f64>,
    pub notes: Option<String>,
    pub price_alerts: bool,
    pub current_market_price: Option<f64>,
}

impl WishlistDraft {
    fn validate(self) -> Result<WishlistDraft, ValidationError> {
        let player_name = require_trimmed("playerName", self.player_name)?;
        let sport = require_trimmed("sport", self.sport)?;
        let year = self.year.map(|y| require_card_year("year", y)).transpose()?;
        let max_price = self.max_price.map(|p| require_non_negative("maxPrice", p)).transpose()?;
        let current_market_price = self
            .current_market_price
            .map(|p| require_non_negative("currentMarketPrice", p))
            .transpose()?;

        Ok(WishlistDraft {
            player_name: Some(player_name),
            sport: Some(sport),
            year,
            manufacturer: optional_trimmed(self.manufacturer),
            set_name: optional_trimmed(self.set_name),
            card_number: optional_trimmed(self.card_number),
            priority: self.priority,
            max_price,
            notes: optional_trimmed(self.notes),
            price_alerts: self.price_alerts,
            current_market_price,
        })
    }
}

impl WishlistItem {
    /// Creates a wishlist item for `user_id` after validating the draft
    ///
    /// ### Errors
    ///
    /// Returns a `ValidationError` when playerName or sport is blank, the
    /// year is out of range, or a price is negative.
    pub fn new(user_id: String, draft: WishlistDraft) -> Result<Self, ValidationError> {
        Self::build(Uuid::new_v4().to_string(), user_id, Utc::now().naive_utc(), draft)
    }

    fn build(
        id: String,
        user_id: String,
        date_added: NaiveDateTime,
        draft: WishlistDraft,
    ) -> Result<Self, ValidationError> {
        let draft = draft.validate()?;
        Ok(Self {
            id,
            user_id,
            player_name: draft.player_name.unwrap_or_default(),
            sport: draft.sport.unwrap_or_default(),
            year: draft.year,
            manufacturer: draft.manufacturer,
            set_name: draft.set_name,
            card_number: draft.card_number,
            priority: draft.priority.as_str().to_string(),
            max_price: draft.max_price,
            notes: draft.notes,
            date_added,
            price_alerts: draft.price_alerts,
            current_market_price: draft.current_market_price,
        })
    }

    pub fn to_draft(&self) -> WishlistDraft {
        WishlistDraft {
            player_name: Some(self.player_name.clone()),
            sport: Some(self.sport.clone()),
            year: self.year,
            manufacturer: self.manufacturer.clone(),
            set_name: self.set_name.clone(),
            card_number: self.card_number.clone(),
            priority: self.get_priority(),
            max_price: self.max_price,
            notes: self.notes.clone(),
            price_alerts: self.price_alerts,
            current_market_price: self.current_market_price,
        }
    }

    /// Replaces the editable fields, keeping id, owner and date added
    pub fn with_draft(&self, draft: WishlistDraft) -> Result<Self, ValidationError> {
        Self::build(self.id.clone(), self.user_id.clone(), self.date_added, draft)
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_player_name(&self) -> &str {
        &self.player_name
    }

    pub fn get_sport(&self) -> &str {
        &self.sport
    }

    pub fn get_year(&self) -> Option<i32> {
        self.year
    }

    /// Stored priorities are always one of the three labels; anything else reads as medium
    pub fn get_priority(&self) -> WishlistPriority {
        self.priority.parse().unwrap_or_default()
    }

    pub fn get_max_price(&self) -> Option<f64> {
        self.max_price
    }

    pub fn get_notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn has_price_alerts(&self) -> bool {
        self.price_alerts
    }

    pub fn get_date_added(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date_added, Utc)
    }
}
