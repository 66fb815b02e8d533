//! Common test utilities for CardWise integration tests
//!
//! This file contains shared functions and utilities for all integration tests:
//! test application setup, a scripted stand-in for the vision model and
//! request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cardwise::{
    create_app,
    db::init_pool,
    maintenance::BackupSettings,
    models::{Condition, ConditionGrade},
    scan::{CardAnalysis, CardImageAnalyzer, ScanError},
    AppState,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::Service;

/// Vision model stand-in answering from a table keyed by file name
#[derive(Default)]
pub struct ScriptedAnalyzer {
    pub reachable: bool,
    pub answers: HashMap<String, CardAnalysis>,
}

impl ScriptedAnalyzer {
    pub fn reachable() -> Self {
        Self { reachable: true, ..Default::default() }
    }

    pub fn with_answer(mut self, file_name: &str, analysis: CardAnalysis) -> Self {
        self.answers.insert(file_name.to_string(), analysis);
        self
    }
}

#[async_trait]
impl CardImageAnalyzer for ScriptedAnalyzer {
    async fn test_connection(&self) -> bool {
        self.reachable
    }

    async fn analyze(&self, image: &Path) -> Result<CardAnalysis, ScanError> {
        let name = image.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.answers
            .get(name)
            .cloned()
            .ok_or_else(|| ScanError::OllamaUnavailable(format!("no answer for {}", name)))
    }
}

/// A confident reading of a card
pub fn confident_analysis(player: &str, confidence: f64) -> CardAnalysis {
    CardAnalysis {
        player_name: Some(player.to_string()),
        sport: Some("Baseball".to_string()),
        year: Some(2011),
        manufacturer: Some("Topps".to_string()),
        set_name: Some("Update".to_string()),
        card_number: Some("US175".to_string()),
        is_rookie_card: true,
        is_autograph: false,
        is_memorabilia: false,
        condition: Some(Condition {
            centering: 9,
            corners: 9,
            edges: 9,
            surface: 9,
            overall: ConditionGrade::Mint,
        }),
        estimated_value: 250.0,
        confidence,
    }
}

/// Creates a test application with an in-memory SQLite database
///
/// This helper function:
/// 1. Creates a uniquely named shared-cache in-memory SQLite database
/// 2. Runs migrations to set up the schema
/// 3. Creates an Axum application over it with the given analyzer
///
/// ### Returns
///
/// An Axum Router configured with all routes, and the directory backups go to
pub fn create_test_app_with(analyzer: ScriptedAnalyzer) -> (Router, PathBuf) {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    {
        let conn = &mut pool.get().unwrap();
        cardwise::run_migrations(conn).unwrap();
    }

    let backup_dir = std::env::temp_dir().join(format!("cardwise-it-{}", uuid::Uuid::new_v4()));
    let backups = BackupSettings { dir: backup_dir.clone(), keep: 2 };

    (create_app(AppState::new(pool, Arc::new(analyzer), backups)), backup_dir)
}

/// Creates a test application whose analyzer is reachable but knows no cards
pub fn create_test_app() -> Router {
    create_test_app_with(ScriptedAnalyzer::reachable()).0
}

/// Sends a request and returns the status and the body parsed as JSON
///
/// Bodies that are not JSON come back as a JSON string.
pub async fn send(app: &mut Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

pub async fn get(app: &mut Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &mut Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Creates the administrator through the seed endpoint
pub async fn seed_admin(app: &mut Router) {
    let (status, body) = send(app, "POST", "/api/seed/admin", None).await;
    assert_eq!(status, StatusCode::OK, "seeding admin failed: {}", body);
}

/// A card body that passes validation
pub fn card_body(player: &str, sport: &str, year: i32, value: f64) -> Value {
    json!({
        "playerName": player,
        "sport": sport,
        "year": year,
        "manufacturer": "Topps",
        "setName": "Chrome",
        "cardNumber": "27",
        "frontImage": "/images/front.jpg",
        "backImage": "/images/back.jpg",
        "condition": {
            "centering": 8,
            "corners": 8,
            "edges": 9,
            "surface": 9,
            "overall": "Near Mint"
        },
        "estimatedValue": value,
        "tags": ["rookie", "chrome"]
    })
}

/// Creates a card via the API and returns its id
pub async fn create_card(app: &mut Router, player: &str, sport: &str, year: i32, value: f64) -> String {
    let (status, body) = post(app, "/api/cards", card_body(player, sport, year, value)).await;
    assert_eq!(status, StatusCode::CREATED, "creating card failed: {}", body);
    body["card"]["_id"].as_str().unwrap().to_string()
}
