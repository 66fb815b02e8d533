/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: users, cards,
/// wishlist items, stored settings, and database upkeep (backups, vacuum).
///
/// The repository pattern abstracts away the details of database access
/// and provides a clean API for the rest of the application to use.

mod user_repo;
mod card_repo;
mod wishlist_repo;
mod settings_repo;
mod maintenance_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use card_repo::*;
pub use wishlist_repo::*;
pub use settings_repo::*;
pub use maintenance_repo::*;
