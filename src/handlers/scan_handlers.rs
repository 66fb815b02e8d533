use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use tracing::{instrument, info, warn};

use crate::AppState;
use crate::dto::StartScanDto;
use crate::errors::ApiError;
use crate::models::ScanningSettings;
use crate::repo;
use crate::scan::processor::start_scan;
use crate::seed;

/// Handler for starting a scan job
///
/// This function handles POST requests to `/api/scan/start`. The job runs
/// in the background; poll `/api/scan/progress/{job_id}` to follow it.
///
/// ### Returns
///
/// * 400 when `jobName` or `folderPath` is missing
/// * 500 when the analyzer cannot be reached
/// * Otherwise the new job and its id
#[instrument(skip(state, payload))]
pub async fn start_scan_handler(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<StartScanDto>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let defaults: ScanningSettings = repo::get_settings(&state.pool)?;
    let request = payload.resolve(&defaults)?;

    if !state.analyzer.test_connection().await {
        warn!("Refusing to start scan {}: analyzer unreachable", request.job_name);
        return Err(ApiError::AnalyzerUnavailable);
    }

    let (admin, _) = seed::ensure_admin_user(&state.pool)?;
    let job = start_scan(state.scan_context(), request, admin.get_id()).await;
    info!("Started scan job {} on {}", job.id, job.folder_path);

    Ok(Json(json!({
        "success": true,
        "message": "Scan job started successfully",
        "jobId": job.id,
        "job": job,
    })))
}

/// Handler for listing scan jobs in creation order
///
/// This function handles GET requests to `/api/scan/jobs`.
#[instrument(skip(state))]
pub async fn list_scan_jobs_handler(
    State(state): State<AppState>,
) -> Json<Value> {
    let jobs = state.scans.list().await;
    Json(json!({ "success": true, "jobs": jobs }))
}

#[instrument(skip(state), fields(job_id = %job_id))]
pub async fn scan_progress_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let job = state
        .scans
        .get(&job_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Scan job not found".to_string()))?;

    Ok(Json(json!({ "success": true, "progress": job.progress_at(Utc::now()) })))
}

#[instrument(skip(state), fields(job_id = %job_id))]
pub async fn pause_scan_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.scans.pause(&job_id).await?;
    Ok(Json(json!({ "success": true, "message": "Scan job paused successfully" })))
}

#[instrument(skip(state), fields(job_id = %job_id))]
pub async fn resume_scan_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.scans.resume(&job_id).await?;
    Ok(Json(json!({ "success": true, "message": "Scan job resumed successfully" })))
}

/// Handler for cancelling a scan job
///
/// The job is removed at once; its processor stops before the next image.
#[instrument(skip(state), fields(job_id = %job_id))]
pub async fn cancel_scan_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.scans.cancel(&job_id).await?;
    Ok(Json(json!({ "success": true, "message": "Scan job cancelled successfully" })))
}
