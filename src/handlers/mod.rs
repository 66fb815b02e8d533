/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository or
/// service functions, and returning a properly formatted response.
///
/// The API has no sign-in: the collection, wishlist and scans all belong to
/// the seeded administrator.

mod card_handlers;
mod wishlist_handlers;
mod scan_handlers;
mod settings_handlers;
mod seed_handlers;
mod misc_handlers;

// Re-export all handlers
pub use card_handlers::*;
pub use wishlist_handlers::*;
pub use scan_handlers::*;
pub use settings_handlers::*;
pub use seed_handlers::*;
pub use misc_handlers::*;

use crate::db::DbPool;
use crate::errors::ApiError;
use crate::seed;

/// Id of the administrator who owns the collection
///
/// ### Errors
///
/// `ApiError::NotFound("Admin user not found")` before the administrator is seeded
fn admin_user_id(pool: &DbPool) -> Result<String, ApiError> {
    seed::find_admin_user(pool)?
        .map(|admin| admin.get_id())
        .ok_or_else(|| ApiError::NotFound("Admin user not found".to_string()))
}
