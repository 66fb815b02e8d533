//! Collection-wide operations behind the settings page: export, import,
//! clearing and scheduled backups

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::db::DbPool;
use crate::dto::{ExportFormat, ImportDto};
use crate::models::Card;
use crate::repo;

/// A rendered export, ready to send as a download
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedCollection {
    pub content_type: &'static str,
    pub file_name: &'static str,
    pub body: String,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    cards: &'a [Card],
}

const CSV_HEADER: [&str; 22] = [
    "_id",
    "playerName",
    "sport",
    "year",
    "manufacturer",
    "setName",
    "cardNumber",
    "frontImage",
    "backImage",
    "centering",
    "corners",
    "edges",
    "surface",
    "overall",
    "isRookieCard",
    "isAutograph",
    "isMemorabilia",
    "estimatedValue",
    "marketValue",
    "tags",
    "notes",
    "lotNumber",
];

/// Renders every card of `user_id` in the requested format
#[instrument(skip(pool))]
pub fn export_collection(
    pool: &DbPool,
    user_id: &str,
    format: ExportFormat,
) -> anyhow::Result<ExportedCollection> {
    let cards = repo::list_all_cards(pool, user_id)?;
    info!("Exporting {} cards as {:?}", cards.len(), format);

    Ok(match format {
        ExportFormat::Json => ExportedCollection {
            content_type: "application/json",
            file_name: "cardwise-collection.json",
            body: serde_json::to_string_pretty(&JsonExport { cards: &cards })?,
        },
        ExportFormat::Csv => ExportedCollection {
            content_type: "text/csv; charset=utf-8",
            file_name: "cardwise-collection.csv",
            body: cards_to_csv(&cards),
        },
    })
}

/// Quotes a CSV field when it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let row: Vec<String> = fields.into_iter().map(|f| csv_field(f.as_ref())).collect();
    row.join(",")
}

/// Header plus one row per card, CRLF line endings; tags are `;`-joined
pub fn cards_to_csv(cards: &[Card]) -> String {
    let mut out = csv_row(CSV_HEADER);
    out.push_str("\r\n");

    for card in cards {
        let condition = card.get_condition();
        let row = csv_row([
            card.get_id(),
            card.get_player_name().to_string(),
            card.get_sport().to_string(),
            card.get_year().to_string(),
            card.get_manufacturer().to_string(),
            card.get_set_name().to_string(),
            card.get_card_number().to_string(),
            card.get_front_image().to_string(),
            card.get_back_image().to_string(),
            condition.centering.to_string(),
            condition.corners.to_string(),
            condition.edges.to_string(),
            condition.surface.to_string(),
            condition.overall.to_string(),
            card.is_rookie_card().to_string(),
            card.is_autograph().to_string(),
            card.is_memorabilia().to_string(),
            card.get_estimated_value().to_string(),
            card.get_market_value().to_string(),
            card.get_tags().join(";"),
            card.get_notes().to_string(),
            card.get_lot_number().unwrap_or_default().to_string(),
        ]);
        out.push_str(&row);
        out.push_str("\r\n");
    }
    out
}

/// Outcome of an import
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    /// One message per rejected card, `card <index>: <reason>`
    pub errors: Vec<String>,
}

/// Adds the valid cards of `payload` to the collection of `user_id`
///
/// Invalid entries are skipped and reported; the valid ones are inserted in
/// one transaction.
#[instrument(skip(pool, payload), fields(cards = payload.cards.len()))]
pub fn import_collection(pool: &DbPool, user_id: &str, payload: ImportDto) -> anyhow::Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut accepted = Vec::new();

    for (index, dto) in payload.cards.into_iter().enumerate() {
        match dto.into_draft().validate() {
            Ok(fields) => accepted.push(Card::new(user_id.to_string(), fields)),
            Err(e) => {
                warn!("Skipping imported card {}: {}", index, e);
                report.failed += 1;
                report.errors.push(format!("card {}: {}", index, e));
            }
        }
    }

    report.imported = repo::create_cards(pool, &accepted)?;
    info!("Imported {} cards, rejected {}", report.imported, report.failed);
    Ok(report)
}

/// Counts of records removed by [`clear_collection`]
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClearedCollection {
    pub cards: usize,
    pub wishlist_items: usize,
}

/// Deletes every card and wishlist item owned by `user_id`
#[instrument(skip(pool))]
pub fn clear_collection(pool: &DbPool, user_id: &str) -> anyhow::Result<ClearedCollection> {
    let cards = repo::delete_cards_for_user(pool, user_id)?;
    let wishlist_items = repo::delete_wishlist_for_user(pool, user_id)?;
    info!("Cleared {} cards and {} wishlist items", cards, wishlist_items);
    Ok(ClearedCollection { cards, wishlist_items })
}

/// Where and how many database backups are kept
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSettings {
    pub dir: PathBuf,
    pub keep: usize,
}

/// Backs the database up every `interval` until the runtime shuts down
///
/// The first backup is taken one full interval after startup.
pub fn spawn_backup_task(pool: Arc<DbPool>, backups: BackupSettings, interval: Duration) -> JoinHandle<()> {
    info!("Scheduling database backups every {:?} into {:?}", interval, backups.dir);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let pool = pool.clone();
            let backups = backups.clone();
            let result = tokio::task::spawn_blocking(move || {
                repo::backup_database(&pool, &backups.dir, backups.keep)
            })
            .await;

            match result {
                Ok(Ok(path)) => info!("Scheduled backup written to {:?}", path),
                Ok(Err(e)) => error!("Scheduled backup failed: {:#}", e),
                Err(e) => error!("Scheduled backup task panicked: {}", e),
            }
        }
    })
}
