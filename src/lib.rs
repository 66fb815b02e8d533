/// CardWise: a sports card collection server
///
/// This library provides the core of the CardWise backend: the card,
/// wishlist and settings data model stored in SQLite, the HTTP API that the
/// web client talks to, and batch scanning of card photos with a local
/// Ollama vision model.
///
/// The server and CLI binaries in `src/bin` are thin wrappers around it.

/// Database connection management
pub mod db;

/// Data models
pub mod models;

/// Repository layer for database operations
pub mod repo;

/// Database schema definitions
pub mod schema;

/// Request and response bodies
pub mod dto;

/// HTTP error mapping
pub mod errors;

/// Layered configuration
pub mod config;

/// Route handlers
pub mod handlers;

/// Tracing setup
pub mod logging;

/// Export, import, clearing and scheduled backups
pub mod maintenance;

/// Password hashing
pub mod password;

/// Card photo scanning
pub mod scan;

/// Initial data
pub mod seed;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::maintenance::BackupSettings;
use crate::scan::processor::ScanContext;
use crate::scan::{CardImageAnalyzer, ScanJobStore};

/// Migrations compiled into the binary
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub scans: Arc<ScanJobStore>,
    pub analyzer: Arc<dyn CardImageAnalyzer>,
    pub backups: BackupSettings,
}

impl AppState {
    pub fn new(pool: Arc<db::DbPool>, analyzer: Arc<dyn CardImageAnalyzer>, backups: BackupSettings) -> Self {
        Self {
            pool,
            scans: Arc::new(ScanJobStore::new()),
            analyzer,
            backups,
        }
    }

    /// The parts of the state a background scan holds on to
    pub fn scan_context(&self) -> ScanContext {
        ScanContext {
            pool: self.pool.clone(),
            jobs: self.scans.clone(),
            analyzer: self.analyzer.clone(),
        }
    }
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - Database pool, scan job store and analyzer shared by all handlers
///
/// ### Returns
///
/// An Axum Router with CORS open to any origin and request tracing
pub fn create_app(state: AppState) -> Router {
    use handlers::*;
    use models::{EbaySettings, NotificationSettings, ScanningSettings, TcgPlayerSettings};

    Router::new()
        .route("/", get(root_handler))
        .route("/api/placeholder/{width}/{height}", get(placeholder_handler))
        // Collection
        .route("/api/cards/stats", get(card_stats_handler))
        .route("/api/cards", get(list_cards_handler).post(create_card_handler))
        .route(
            "/api/cards/{id}",
            get(get_card_handler).put(update_card_handler).delete(delete_card_handler),
        )
        // Wishlist
        .route("/api/wishlist", get(list_wishlist_handler).post(create_wishlist_item_handler))
        .route(
            "/api/wishlist/{id}",
            get(get_wishlist_item_handler)
                .put(update_wishlist_item_handler)
                .delete(delete_wishlist_item_handler),
        )
        // Scanning
        .route("/api/scan/start", post(start_scan_handler))
        .route("/api/scan/jobs", get(list_scan_jobs_handler))
        .route("/api/scan/progress/{job_id}", get(scan_progress_handler))
        .route("/api/scan/pause/{job_id}", post(pause_scan_handler))
        .route("/api/scan/resume/{job_id}", post(resume_scan_handler))
        .route("/api/scan/cancel/{job_id}", post(cancel_scan_handler))
        // Settings
        .route(
            "/api/settings/ebay",
            get(get_settings_handler::<EbaySettings>).post(save_settings_handler::<EbaySettings>),
        )
        .route("/api/settings/ebay/rotate-cert", post(rotate_ebay_cert_handler))
        .route(
            "/api/settings/tcgplayer",
            get(get_settings_handler::<TcgPlayerSettings>).post(save_settings_handler::<TcgPlayerSettings>),
        )
        .route(
            "/api/settings/notifications",
            get(get_settings_handler::<NotificationSettings>)
                .post(save_settings_handler::<NotificationSettings>),
        )
        .route(
            "/api/settings/scanning",
            get(get_settings_handler::<ScanningSettings>).post(save_settings_handler::<ScanningSettings>),
        )
        .route("/api/settings/export", get(export_collection_handler))
        .route("/api/settings/import", post(import_collection_handler))
        .route("/api/settings/backup", post(backup_handler))
        .route("/api/settings/maintenance", post(maintenance_handler))
        .route("/api/settings/clear-all", delete(clear_collection_handler))
        // Seeding
        .route("/api/seed/admin", post(seed_admin_handler))
        .route("/api/seed/cards", post(seed_cards_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any pending migration fails
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}
