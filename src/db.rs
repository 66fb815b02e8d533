use std::time::Duration;

use anyhow::{Context, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use tracing::debug;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection SQLite settings applied when the pool opens a connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// Whether `PRAGMA foreign_keys` is switched on
    pub enable_foreign_keys: bool,
    /// How long SQLite waits on a locked database before giving up
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        if self.enable_foreign_keys {
            conn.batch_execute("PRAGMA foreign_keys = ON;")
                .map_err(diesel::r2d2::Error::QueryError)?;
        }
        if let Some(timeout) = self.busy_timeout {
            conn.batch_execute(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()))
                .map_err(diesel::r2d2::Error::QueryError)?;
        }
        Ok(())
    }
}

/// Builds the SQLite connection pool
///
/// ### Arguments
///
/// * `database_url` - Path or URI of the SQLite database
///
/// ### Errors
///
/// Returns an error if the first connection cannot be opened
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    debug!("Opening database pool at {}", database_url);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
        .with_context(|| format!("Failed to create pool for {}", database_url))
}
