use crate::db::DbPool;
use crate::models::{Setting, SettingsSection};
use crate::schema::settings;
use diesel::prelude::*;
use anyhow::{Context, Result};
use tracing::{instrument, debug, info};

/// Reads a settings section, falling back to its defaults when never saved
///
/// ### Errors
///
/// Returns an error if the query fails or the stored document no longer parses
#[instrument(skip(pool), fields(section = S::NAME))]
pub fn get_settings<S: SettingsSection>(pool: &DbPool) -> Result<S> {
    let conn = &mut pool.get()?;

    let row = settings::table
        .find(S::NAME)
        .select(Setting::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => row
            .to_section()
            .with_context(|| format!("Stored {} settings are not valid", S::NAME)),
        None => {
            debug!("No stored settings, using defaults");
            Ok(S::default())
        }
    }
}

/// Stores a settings section, replacing any previous version
#[instrument(skip(pool, section), fields(section = S::NAME))]
pub fn save_settings<S: SettingsSection>(pool: &DbPool, section: &S) -> Result<()> {
    let conn = &mut pool.get()?;
    let row = Setting::from_section(section)?;

    diesel::insert_into(settings::table)
        .values(&row)
        .on_conflict(settings::name)
        .do_update()
        .set(&row)
        .execute(conn)?;

    info!("Saved settings: {:?}", section.redacted());
    Ok(())
}
