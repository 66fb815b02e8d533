use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, info};

use super::admin_user_id;
use crate::db::DbPool;
use crate::dto::WishlistRequest;
use crate::errors::ApiError;
use crate::models::WishlistItem;
use crate::repo;

fn owned_item(pool: &DbPool, owner_id: &str, id: &str) -> Result<WishlistItem, ApiError> {
    repo::get_wishlist_item(pool, id)?
        .filter(|item| item.get_user_id() == owner_id)
        .ok_or_else(|| ApiError::NotFound("Wishlist item not found".to_string()))
}

/// Handler for listing the wishlist, newest first
///
/// This function handles GET requests to `/api/wishlist`.
#[instrument(skip(pool))]
pub async fn list_wishlist_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let items = repo::list_wishlist_items(&pool, &owner_id)?;
    Ok(Json(json!({ "success": true, "items": items })))
}

#[instrument(skip(pool), fields(item_id = %id))]
pub async fn get_wishlist_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let item = owned_item(&pool, &owner_id, &id)?;
    Ok(Json(json!({ "success": true, "item": item })))
}

/// Handler for adding a wanted card
///
/// This function handles POST requests to `/api/wishlist` with a body of
/// the form `{"item": {...}}`.
#[instrument(skip(pool, payload))]
pub async fn create_wishlist_item_handler(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(payload), _): WithRejection<Json<WishlistRequest>, ApiError>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let item = WishlistItem::new(owner_id, payload.item.into_draft())?;

    let item = repo::create_wishlist_item(&pool, item)?;
    info!("Added {} to the wishlist", item.get_player_name());

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "item": item }))))
}

#[instrument(skip(pool, payload), fields(item_id = %id))]
pub async fn update_wishlist_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<WishlistRequest>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let existing = owned_item(&pool, &owner_id, &id)?;

    let updated = existing.with_draft(payload.item.apply_to(existing.to_draft()))?;
    let item = repo::update_wishlist_item(&pool, &updated)?;

    Ok(Json(json!({ "success": true, "item": item })))
}

#[instrument(skip(pool), fields(item_id = %id))]
pub async fn delete_wishlist_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    owned_item(&pool, &owner_id, &id)?;

    if !repo::delete_wishlist_item(&pool, &id)? {
        return Err(ApiError::NotFound("Wishlist item not found".to_string()));
    }
    info!("Removed wishlist item");

    Ok(Json(json!({ "success": true, "message": "Item removed from wishlist" })))
}
