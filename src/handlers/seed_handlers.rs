use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::db::DbPool;
use crate::errors::ApiError;
use crate::seed::{self, AdminSeedResult, CardSeedResult};

/// Handler creating the administrator account
///
/// This function handles POST requests to `/api/seed/admin` and is safe to
/// repeat.
#[instrument(skip(pool))]
pub async fn seed_admin_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<AdminSeedResult>, ApiError> {
    let result = seed::seed_admin_user(&pool)?;
    info!("Admin user seeding completed: {}", result.message);
    Ok(Json(result))
}

/// Handler giving the administrator the sample cards
///
/// This function handles POST requests to `/api/seed/cards`.
#[instrument(skip(pool))]
pub async fn seed_cards_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<CardSeedResult>, ApiError> {
    let result = seed::seed_sample_cards(&pool)?;
    info!("Sample card seeding completed: {}", result.message);
    Ok(Json(result))
}
