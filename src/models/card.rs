use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{require_card_year, require_non_negative, require_trimmed, optional_trimmed};
use super::{Condition, TagList, ValidationError};

/// Represents a sports card in a user's collection
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier for the card (UUID v4 as string)
    #[serde(rename = "_id")]
    id: String,

    /// The user who owns this card
    user_id: String,

    player_name: String,
    sport: String,
    year: i32,
    manufacturer: String,
    set_name: String,
    card_number: String,

    /// Path or URL of the front photo
    front_image: String,

    /// Path or URL of the back photo
    back_image: String,

    condition: Condition,

    is_rookie_card: bool,
    is_autograph: bool,
    is_memorabilia: bool,

    /// The owner's own valuation in dollars
    estimated_value: f64,

    /// Last known market price in dollars
    market_value: f64,

    tags: TagList,
    notes: String,

    /// Label of the lot the card arrived in
    lot_number: Option<String>,

    /// Whether the card is listed on the trade list
    is_for_trade: bool,

    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// The user-editable fields of a card, before it is assigned an id and owner
///
/// Drafts are built from API payloads or scan results and must pass
/// [`CardDraft::validate`] before they become a [`Card`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardDraft {
    pub player_name: Option<String>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    pub manufacturer: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub condition: Option<Condition>,
    pub is_rookie_card: bool,
    pub is_autograph: bool,
    pub is_memorabilia: bool,
    pub estimated_value: f64,
    pub market_value: f64,
    pub tags: Vec<String>,
    pub notes: String,
    pub lot_number: Option<String>,
    pub is_for_trade: bool,
}

/// A draft that passed validation, with every string trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCard {
    player_name: String,
    sport: String,
    year: i32,
    manufacturer: String,
    set_name: String,
    card_number: String,
    front_image: String,
    back_image: String,
    condition: Condition,
    is_rookie_card: bool,
    is_autograph: bool,
    is_memorabilia: bool,
    estimated_value: f64,
    market_value: f64,
    tags: TagList,
    notes: String,
    lot_number: Option<String>,
    is_for_trade: bool,
}

impl CardDraft {
    /// Validates the draft against the collection rules
    ///
    /// ### Errors
    ///
    /// Returns the first rule the draft breaks: a missing required field,
    /// a year outside 1800 through next year, a condition score outside 1-10,
    /// or a negative value.
    pub fn validate(self) -> Result<ValidCard, ValidationError> {
        let player_name = require_trimmed("playerName", self.player_name)?;
        let sport = require_trimmed("sport", self.sport)?;
        let year = require_card_year("year", self.year.ok_or(ValidationError::Required("year"))?)?;
        let manufacturer = require_trimmed("manufacturer", self.manufacturer)?;
        let set_name = require_trimmed("setName", self.set_name)?;
        let card_number = require_trimmed("cardNumber", self.card_number)?;
        let front_image = require_trimmed("frontImage", self.front_image)?;
        let back_image = require_trimmed("backImage", self.back_image)?;
        let condition = self.condition.ok_or(ValidationError::Required("condition"))?;
        condition.validate()?;
        let estimated_value = require_non_negative("estimatedValue", self.estimated_value)?;
        let market_value = require_non_negative("marketValue", self.market_value)?;

        Ok(ValidCard {
            player_name,
            sport,
            year,
            manufacturer,
            set_name,
            card_number,
            front_image,
            back_image,
            condition,
            is_rookie_card: self.is_rookie_card,
            is_autograph: self.is_autograph,
            is_memorabilia: self.is_memorabilia,
            estimated_value,
            market_value,
            tags: TagList::normalized(self.tags),
            notes: self.notes.trim().to_string(),
            lot_number: optional_trimmed(self.lot_number),
            is_for_trade: self.is_for_trade,
        })
    }
}

impl ValidCard {
    pub fn get_player_name(&self) -> &str {
        &self.player_name
    }
}

impl Card {
    /// Creates a new card owned by `user_id` from validated fields
    ///
    /// ### Arguments
    ///
    /// * `user_id` - The ID of the owning user
    /// * `fields` - The validated card fields
    ///
    /// ### Returns
    ///
    /// A new `Card` with a fresh id and both timestamps set to now
    pub fn new(user_id: String, fields: ValidCard) -> Self {
        let now = Utc::now().naive_utc();
        Self::from_parts(Uuid::new_v4().to_string(), user_id, fields, now, now)
    }

    fn from_parts(
        id: String,
        user_id: String,
        fields: ValidCard,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            user_id,
            player_name: fields.player_name,
            sport: fields.sport,
            year: fields.year,
            manufacturer: fields.manufacturer,
            set_name: fields.set_name,
            card_number: fields.card_number,
            front_image: fields.front_image,
            back_image: fields.back_image,
            condition: fields.condition,
            is_rookie_card: fields.is_rookie_card,
            is_autograph: fields.is_autograph,
            is_memorabilia: fields.is_memorabilia,
            estimated_value: fields.estimated_value,
            market_value: fields.market_value,
            tags: fields.tags,
            notes: fields.notes,
            lot_number: fields.lot_number,
            is_for_trade: fields.is_for_trade,
            created_at,
            updated_at,
        }
    }

    /// Returns the editable fields of this card as a draft
    ///
    /// Used by partial updates: the draft is patched and revalidated.
    pub fn to_draft(&self) -> CardDraft {
        CardDraft {
            player_name: Some(self.player_name.clone()),
            sport: Some(self.sport.clone()),
            year: Some(self.year),
            manufacturer: Some(self.manufacturer.clone()),
            set_name: Some(self.set_name.clone()),
            card_number: Some(self.card_number.clone()),
            front_image: Some(self.front_image.clone()),
            back_image: Some(self.back_image.clone()),
            condition: Some(self.condition.clone()),
            is_rookie_card: self.is_rookie_card,
            is_autograph: self.is_autograph,
            is_memorabilia: self.is_memorabilia,
            estimated_value: self.estimated_value,
            market_value: self.market_value,
            tags: self.tags.0.clone(),
            notes: self.notes.clone(),
            lot_number: self.lot_number.clone(),
            is_for_trade: self.is_for_trade,
        }
    }

    /// Replaces the editable fields, keeping id, owner and creation time
    pub fn with_fields(&self, fields: ValidCard) -> Self {
        Self::from_parts(
            self.id.clone(),
            self.user_id.clone(),
            fields,
            self.created_at,
            Utc::now().naive_utc(),
        )
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

    pub fn get_year(&self) -> i32 {
        self.year
    }

    pub fn get_manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn get_set_name(&self) -> &str {
        &self.set_name
    }

    pub fn get_card_number(&self) -> &str {
        &self.card_number
    }

    pub fn get_front_image(&self) -> &str {
        &self.front_image
    }

    pub fn get_back_image(&self) -> &str {
        &self.back_image
    }

    pub fn get_condition(&self) -> &Condition {
        &self.condition
    }

    pub fn is_rookie_card(&self) -> bool {
        self.is_rookie_card
    }

    pub fn is_autograph(&self) -> bool {
        self.is_autograph
    }

    pub fn is_memorabilia(&self) -> bool {
        self.is_memorabilia
    }

    pub fn get_estimated_value(&self) -> f64 {
        self.estimated_value
    }

    pub fn get_market_value(&self) -> f64 {
        self.market_value
    }

    pub fn get_tags(&self) -> &[String] {
        &self.tags.0
    }

    pub fn get_notes(&self) -> &str {
        &self.notes
    }

    pub fn get_lot_number(&self) -> Option<&str> {
        self.lot_number.as_deref()
    }

    pub fn is_for_trade(&self) -> bool {
        self.is_for_trade
    }

    /// Gets the card's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConditionGrade;

    pub(crate) fn sample_draft() -> CardDraft {
        CardDraft {
            player_name: Some("  Mike Trout ".to_string()),
            sport: Some("Baseball".to_string()),
            year: Some(2009),
            manufacturer: Some("Topps".to_string()),
            set_name: Some("Bowman Chrome".to_string()),
            card_number: Some("BC1".to_string()),
            front_image: Some("/api/placeholder/250/350".to_string()),
            back_image: Some("/api/placeholder/250/350".to_string()),
            condition: Some(Condition {
                centering: 9,
                corners: 9,
                edges: 8,
                surface: 9,
                overall: ConditionGrade::NearMint,
            }),
            estimated_value: 2500.0,
            market_value: 2650.0,
            tags: vec!["rookie".to_string(), "  ".to_string(), " chrome ".to_string()],
            notes: " Excellent ".to_string(),
            lot_number: Some("   ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_trims_and_normalizes() {
        let fields = sample_draft().validate().unwrap();
        let card = Card::new("user-1".to_string(), fields);

        assert_eq!(card.get_player_name(), "Mike Trout");
        assert_eq!(card.get_tags(), &["rookie".to_string(), "chrome".to_string()]);
        assert_eq!(card.get_notes(), "Excellent");
        assert_eq!(card.get_lot_number(), None);
        assert_eq!(card.get_user_id(), "user-1");
        assert_eq!(card.get_created_at(), card.get_updated_at());
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let draft = CardDraft {
            player_name: Some("   ".to_string()),
            ..sample_draft()
        };
        assert_eq!(draft.validate().unwrap_err(), ValidationError::Required("playerName"));

        let draft = CardDraft {
            condition: None,
            ..sample_draft()
        };
        assert_eq!(draft.validate().unwrap_err(), ValidationError::Required("condition"));
    }

    #[test]
    fn test_validate_rejects_negative_value() {
        let draft = CardDraft {
            market_value: -1.0,
            ..sample_draft()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "marketValue must be a non-negative number");
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let card = Card::new("user-1".to_string(), sample_draft().validate().unwrap());
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["_id"], card.get_id());
        assert_eq!(json["playerName"], "Mike Trout");
        assert_eq!(json["condition"]["overall"], "Near Mint");
        assert_eq!(json["isForTrade"], false);
        assert!(json.get("player_name").is_none());
    }

    #[test]
    fn test_with_fields_keeps_identity() {
        let card = Card::new("user-1".to_string(), sample_draft().validate().unwrap());
        let mut draft = card.to_draft();
        draft.is_for_trade = true;
        draft.player_name = Some("Shohei Ohtani".to_string());

        let updated = card.with_fields(draft.validate().unwrap());

        assert_eq!(updated.get_id(), card.get_id());
        assert_eq!(updated.get_user_id(), card.get_user_id());
        assert_eq!(updated.get_created_at(), card.get_created_at());
        assert_eq!(updated.get_player_name(), "Shohei Ohtani");
        assert!(updated.is_for_trade());
    }
}
