use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use super::admin_user_id;
use crate::AppState;
use crate::db::DbPool;
use crate::dto::{ExportQuery, ImportDto};
use crate::errors::ApiError;
use crate::maintenance;
use crate::models::SettingsSection;
use crate::repo;

/// Handler returning one settings section, or its defaults if never saved
///
/// Mounted at `GET /api/settings/{section}` for every section type.
#[instrument(skip(pool), fields(section = S::NAME))]
pub async fn get_settings_handler<S: SettingsSection>(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<S>, ApiError> {
    let section: S = repo::get_settings(&pool)?;
    debug!("Returning settings: {:?}", section.redacted());
    Ok(Json(section))
}

/// Handler storing one settings section
///
/// Mounted at `POST /api/settings/{section}`. The body replaces the stored
/// section; missing fields take their defaults.
#[instrument(skip(pool, section), fields(section = S::NAME))]
pub async fn save_settings_handler<S: SettingsSection>(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(section), _): WithRejection<Json<S>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    if let Err(e) = section.validate() {
        warn!("Rejected settings {:?}: {}", section.redacted(), e);
        return Err(e.into());
    }

    repo::save_settings(&pool, &section)?;
    Ok(Json(json!({ "success": true, "message": S::SAVED_MESSAGE })))
}

/// Handler acknowledging a certificate rotation request
///
/// Rotation itself needs the eBay API, which this server does not talk to.
#[instrument]
pub async fn rotate_ebay_cert_handler() -> Json<Value> {
    info!("eBay Cert ID rotation requested");
    Json(json!({
        "success": true,
        "message": "eBay Cert ID rotation initiated. This feature requires eBay API integration.",
    }))
}

/// Handler for downloading the collection
///
/// This function handles GET requests to `/api/settings/export?format=json|csv`.
#[instrument(skip(pool))]
pub async fn export_collection_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let owner_id = admin_user_id(&pool)?;
    let export = maintenance::export_collection(&pool, &owner_id, format)?;

    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.body,
    )
        .into_response())
}

/// Handler for loading cards from an earlier export
///
/// This function handles POST requests to `/api/settings/import` with a
/// body of the form `{"cards": [...]}`.
#[instrument(skip(pool, payload))]
pub async fn import_collection_handler(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(payload), _): WithRejection<Json<ImportDto>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let report = maintenance::import_collection(&pool, &owner_id, payload)?;

    Ok(Json(json!({
        "success": true,
        "message": "Collection import completed",
        "imported": report.imported,
        "failed": report.failed,
        "errors": report.errors,
    })))
}

#[instrument(skip(state))]
pub async fn backup_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let pool = state.pool.clone();
    let backups = state.backups.clone();
    let path = tokio::task::spawn_blocking(move || {
        repo::backup_database(&pool, &backups.dir, backups.keep)
    })
    .await
    .map_err(anyhow::Error::new)??;

    Ok(Json(json!({
        "success": true,
        "message": "Database backup created successfully",
        "path": path.display().to_string(),
    })))
}

#[instrument(skip(pool))]
pub async fn maintenance_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || repo::run_maintenance(&pool))
        .await
        .map_err(anyhow::Error::new)??;

    Ok(Json(json!({
        "success": true,
        "message": "Database maintenance completed successfully",
    })))
}

/// Handler deleting every card and wishlist item of the collection
#[instrument(skip(pool))]
pub async fn clear_collection_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = admin_user_id(&pool)?;
    let cleared = maintenance::clear_collection(&pool, &owner_id)?;

    Ok(Json(json!({
        "success": true,
        "message": "All collection data cleared successfully",
        "cleared": cleared,
    })))
}
