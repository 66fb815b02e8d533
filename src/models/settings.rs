use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A stored settings document, one row per section
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Setting {
    name: String,
    value: String,
    updated_at: NaiveDateTime,
}

impl Setting {
    /// Serializes a section into a row ready to upsert
    pub fn from_section<S: SettingsSection>(section: &S) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: S::NAME.to_string(),
            value: serde_json::to_string(section)?,
            updated_at: Utc::now().naive_utc(),
        })
    }

    /// Parses the stored JSON back into its section type
    pub fn to_section<S: SettingsSection>(&self) -> Result<S, serde_json::Error> {
        serde_json::from_str(&self.value)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

/// A named group of settings persisted as one JSON document
///
/// Missing fields in a stored or posted document take the section's defaults.
pub trait SettingsSection: Serialize + DeserializeOwned + Default + Clone + std::fmt::Debug + Send + 'static {
    /// Row key in the `settings` table, also the URL segment
    const NAME: &'static str;

    /// Message returned after a successful save
    const SAVED_MESSAGE: &'static str;

    /// Checks a posted document before it is saved
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// A copy safe to write to logs
    fn redacted(&self) -> Self {
        self.clone()
    }
}

const REDACTED: &str = "[REDACTED]";

fn redact(value: &str) -> String {
    if value.is_empty() { "EMPTY".to_string() } else { REDACTED.to_string() }
}

fn sandbox() -> String {
    "sandbox".to_string()
}

/// eBay developer credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EbaySettings {
    pub app_id: String,
    pub dev_id: String,
    pub cert_id: String,
    pub user_token: String,
    pub environment: String,
}

impl Default for EbaySettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            dev_id: String::new(),
            cert_id: String::new(),
            user_token: String::new(),
            environment: sandbox(),
        }
    }
}

impl SettingsSection for EbaySettings {
    const NAME: &'static str = "ebay";
    const SAVED_MESSAGE: &'static str = "eBay configuration saved successfully";

    fn validate(&self) -> Result<(), ValidationError> {
        if [&self.app_id, &self.dev_id, &self.cert_id].iter().any(|v| v.trim().is_empty()) {
            return Err(ValidationError::Invalid(
                "App ID, Dev ID, and Cert ID are required".to_string(),
            ));
        }
        Ok(())
    }

    fn redacted(&self) -> Self {
        Self {
            cert_id: redact(&self.cert_id),
            user_token: redact(&self.user_token),
            ..self.clone()
        }
    }
}

/// TCGPlayer partner credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TcgPlayerSettings {
    pub api_key: String,
    pub partner_id: String,
    pub environment: String,
}

impl Default for TcgPlayerSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            partner_id: String::new(),
            environment: sandbox(),
        }
    }
}

impl SettingsSection for TcgPlayerSettings {
    const NAME: &'static str = "tcgplayer";
    const SAVED_MESSAGE: &'static str = "TCGPlayer configuration saved successfully";

    fn redacted(&self) -> Self {
        Self {
            api_key: redact(&self.api_key),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub price_alerts: bool,
    pub trade_requests: bool,
    pub market_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            price_alerts: true,
            trade_requests: true,
            market_updates: false,
        }
    }
}

impl SettingsSection for NotificationSettings {
    const NAME: &'static str = "notifications";
    const SAVED_MESSAGE: &'static str = "Notification preferences saved successfully";
}

/// Defaults for new scan jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanningSettings {
    pub auto_process: bool,
    /// Minimum model confidence, 0 to 1, for a scanned card to be saved
    pub confidence_threshold: f64,
    pub image_quality: String,
    pub batch_size: u32,
}

impl Default for ScanningSettings {
    fn default() -> Self {
        Self {
            auto_process: true,
            confidence_threshold: 0.8,
            image_quality: "high".to_string(),
            batch_size: 10,
        }
    }
}

impl SettingsSection for ScanningSettings {
    const NAME: &'static str = "scanning";
    const SAVED_MESSAGE: &'static str = "Scanning preferences saved successfully";

    fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::OutOfRange {
                field: "confidenceThreshold",
                rule: "between 0 and 1".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ValidationError::OutOfRange {
                field: "batchSize",
                rule: "at least 1".to_string(),
            });
        }
        Ok(())
    }
}
