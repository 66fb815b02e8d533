use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use super::admin_user_id;
use crate::db::DbPool;
use crate::dto::{CardDto, CardListQuery, CardPage};
use crate::errors::ApiError;
use crate::models::Card;
use crate::repo;

/// Loads a card of the collection, treating other owners' cards as missing
fn owned_card(pool: &DbPool, owner_id: &str, id: &str) -> Result<Card, ApiError> {
    repo::get_card(pool, id)?
        .filter(|card| card.get_user_id() == owner_id)
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))
}

/// Handler for the collection dashboard figures
///
/// This function handles GET requests to `/api/cards/stats`.
#[instrument(skip(pool))]
pub async fn card_stats_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let stats = repo::collection_stats(&pool, &owner_id)?;

    debug!("Collection holds {} cards", stats.total_cards);
    Ok(Json(json!({ "success": true, "stats": stats })))
}

/// Handler for listing the collection
///
/// This function handles GET requests to `/api/cards`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - Paging (`page`, `limit`) and filters (`search`, `sport`, `year`, `forTrade`)
///
/// ### Returns
///
/// One page of cards, newest first, with the total and page count
#[instrument(skip(pool, query))]
pub async fn list_cards_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<CardListQuery>,
) -> Result<Json<Value>, ApiError> {
    debug!("Listing cards with filters: {:?}", query);
    let owner_id = admin_user_id(&pool)?;

    let (cards, total) = repo::list_cards(&pool, &owner_id, &query)?;
    info!("Retrieved {} of {} cards", cards.len(), total);

    let page = CardPage::new(cards, total, query.page(), query.limit);
    Ok(Json(json!({
        "success": true,
        "cards": page.cards,
        "total": page.total,
        "page": page.page,
        "totalPages": page.total_pages,
    })))
}

/// Handler for retrieving a specific card
///
/// This function handles GET requests to `/api/cards/{id}`.
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn get_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let card = owned_card(&pool, &owner_id, &id)?;
    Ok(Json(json!({ "success": true, "card": card })))
}

/// Handler for adding a card to the collection
///
/// This function handles POST requests to `/api/cards`.
///
/// ### Returns
///
/// 201 with the stored card, or 400 naming the first broken rule
#[instrument(skip(pool, payload))]
pub async fn create_card_handler(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(payload), _): WithRejection<Json<CardDto>, ApiError>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let fields = payload.into_draft().validate()?;

    let card = repo::create_card(&pool, Card::new(owner_id, fields))?;
    info!("Created card {} ({})", card.get_id(), card.get_player_name());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Card created successfully",
            "card": card,
        })),
    ))
}

/// Handler for editing a card
///
/// This function handles PUT requests to `/api/cards/{id}`. Fields missing
/// from the body keep their stored values; the merged card is revalidated.
#[instrument(skip(pool, payload), fields(card_id = %id))]
pub async fn update_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<CardDto>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let existing = owned_card(&pool, &owner_id, &id)?;

    let fields = payload.apply_to(existing.to_draft()).validate()?;
    let card = repo::update_card(&pool, &existing.with_fields(fields))?;
    info!("Updated card {}", card.get_id());

    Ok(Json(json!({
        "success": true,
        "message": "Card updated successfully",
        "card": card,
    })))
}

/// Handler for removing a card
///
/// This function handles DELETE requests to `/api/cards/{id}`.
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn delete_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    owned_card(&pool, &owner_id, &id)?;

    repo::delete_card(&pool, &id)?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;
    info!("Deleted card");

    Ok(Json(json!({ "success": true, "message": "Card deleted successfully" })))
}
