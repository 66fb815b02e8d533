use crate::*;
use crate::models::{CardDraft, Condition, ConditionGrade};
use crate::scan::analyzer::testing::ScriptedAnalyzer;
use proptest::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use diesel::RunQueryDsl;
use std::sync::Arc;
use tower::ServiceExt;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Enables foreign key constraints (through the pool's connection options)
/// 3. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Plain ":memory:" gives each connection its own database, so a unique
    // shared-cache URI keeps every pooled connection on the same one.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Application state over `pool` with a reachable scripted analyzer
pub fn test_state(pool: Arc<db::DbPool>) -> AppState {
    let backups = maintenance::BackupSettings {
        dir: std::env::temp_dir().join(format!("cardwise-test-backups-{}", uuid::Uuid::new_v4())),
        keep: 3,
    };
    AppState::new(pool, Arc::new(ScriptedAnalyzer::reachable()), backups)
}

use diesel::sql_types::Text;
use diesel::QueryableByName;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. The database has the expected tables
/// 3. The app answers on the fresh database
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "cards", "wishlist_items", "settings",
        "__diesel_schema_migrations",
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let app = create_app(test_state(pool.clone()));
    let request = Request::builder()
        .uri("/")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Generates a year inside the accepted card range
pub fn arb_card_year() -> impl Strategy<Value = i32> {
    1800i32..=2025i32
}

/// Generates a year outside the accepted card range
pub fn arb_invalid_card_year() -> impl Strategy<Value = i32> {
    prop_oneof![
        (-5000i32..1800i32),
        (2100i32..10_000i32),
    ]
}

/// Generates a condition sub-score in 1..=10
pub fn arb_condition_score() -> impl Strategy<Value = i32> {
    Condition::SCORE_RANGE
}

/// Generates a condition sub-score outside 1..=10
pub fn arb_invalid_condition_score() -> impl Strategy<Value = i32> {
    prop_oneof![
        (-100i32..1i32),
        (11i32..100i32),
    ]
}

/// Generates a dollar amount with cents, never negative
pub fn arb_money() -> impl Strategy<Value = f64> {
    (0u32..=10_000_000u32).prop_map(|cents| cents as f64 / 100.0)
}

/// Generates a strictly negative dollar amount
pub fn arb_negative_money() -> impl Strategy<Value = f64> {
    (1u32..=10_000_000u32).prop_map(|cents| -(cents as f64) / 100.0)
}

pub fn arb_condition_grade() -> impl Strategy<Value = ConditionGrade> {
    proptest::sample::select(ConditionGrade::ALL.to_vec())
}

pub fn arb_condition() -> impl Strategy<Value = Condition> {
    (
        arb_condition_score(),
        arb_condition_score(),
        arb_condition_score(),
        arb_condition_score(),
        arb_condition_grade(),
    ).prop_map(|(centering, corners, edges, surface, overall)| Condition {
        centering,
        corners,
        edges,
        surface,
        overall,
    })
}

/// Generates a non-blank single-line name, possibly padded with spaces
pub fn arb_name() -> impl Strategy<Value = String> {
    "[ ]{0,2}[A-Za-z0-9][A-Za-z0-9 .'-]{0,30}[ ]{0,2}"
}

/// Generates a card draft that passes validation
pub fn arb_card_draft() -> impl Strategy<Value = CardDraft> {
    (
        (arb_name(), arb_name(), arb_card_year(), arb_name(), arb_name(), arb_name()),
        arb_condition(),
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
        (arb_money(), arb_money()),
        prop::collection::vec("[ ]?[a-z]{0,8}[ ]?", 0..5),
    ).prop_map(|(
        (player_name, sport, year, manufacturer, set_name, card_number),
        condition,
        (is_rookie_card, is_autograph, is_memorabilia, is_for_trade),
        (estimated_value, market_value),
        tags,
    )| CardDraft {
        player_name: Some(player_name),
        sport: Some(sport),
        year: Some(year),
        manufacturer: Some(manufacturer),
        set_name: Some(set_name),
        card_number: Some(card_number),
        front_image: Some("/images/front.jpg".to_string()),
        back_image: Some("/images/back.jpg".to_string()),
        condition: Some(condition),
        is_rookie_card,
        is_autograph,
        is_memorabilia,
        estimated_value,
        market_value,
        tags,
        notes: String::new(),
        lot_number: None,
        is_for_trade,
    })
}
