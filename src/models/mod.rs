/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes database models that map to database tables, the in-memory scan
/// job records, and the validation rules every payload passes before storage.

mod validation;
pub use validation::ValidationError;

mod json_value;
pub use json_value::TagList;

mod condition;
pub use condition::{Condition, ConditionGrade};

mod card;
pub use card::{Card, CardDraft, ValidCard};

mod wishlist_item;
pub use wishlist_item::{WishlistDraft, WishlistItem, WishlistPriority};

mod user;
pub use user::User;

mod settings;
pub use settings::{
    EbaySettings, NotificationSettings, ScanningSettings, Setting, SettingsSection,
    TcgPlayerSettings,
};

mod scan_job;
pub use scan_job::{ScanJob, ScanJobSettings, ScanProgress, ScanStatus};
