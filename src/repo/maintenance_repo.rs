use std::fs;
use std::path::{Path, PathBuf};

use crate::db::DbPool;
use chrono::Utc;
use diesel::connection::SimpleConnection;
use anyhow::{Context, Result};
use tracing::{instrument, debug, info, warn};

const BACKUP_PREFIX: &str = "cardwise-";
const BACKUP_SUFFIX: &str = ".db";

/// Writes a consistent copy of the database into `backup_dir`
///
/// The copy is made with `VACUUM INTO`, so it is compacted and safe to take
/// while the server is running. Afterwards the oldest backups beyond `keep`
/// are removed.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `backup_dir` - Directory for backup files, created if missing
/// * `keep` - How many backups to retain; the new backup is always kept
///
/// ### Returns
///
/// The path of the new backup file
#[instrument(skip(pool))]
pub fn backup_database(pool: &DbPool, backup_dir: &Path, keep: usize) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir)
        .with_context(|| format!("Failed to create backup directory {:?}", backup_dir))?;

    let file_name = format!(
        "{}{}{}",
        BACKUP_PREFIX,
        Utc::now().format("%Y%m%d-%H%M%S%3f"),
        BACKUP_SUFFIX
    );
    let target = backup_dir.join(file_name);

    let conn = &mut pool.get()?;
    let quoted = target.to_string_lossy().replace('\'', "''");
    conn.batch_execute(&format!("VACUUM INTO '{}';", quoted))
        .with_context(|| format!("Failed to write backup to {:?}", target))?;

    info!("Database backed up to {:?}", target);

    prune_backups(backup_dir, keep.max(1))?;
    Ok(target)
}

/// Lists backup files in `backup_dir`, oldest first
pub fn list_backups(backup_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut backups: Vec<PathBuf> = fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(BACKUP_SUFFIX))
        })
        .collect();
    // Timestamped names sort chronologically
    backups.sort();
    Ok(backups)
}

/// Deletes the oldest backups so that at most `keep` remain
pub fn prune_backups(backup_dir: &Path, keep: usize) -> Result<usize> {
    let backups = list_backups(backup_dir)?;
    let excess = backups.len().saturating_sub(keep);

    for old in &backups[..excess] {
        match fs::remove_file(old) {
            Ok(()) => debug!("Removed old backup {:?}", old),
            Err(e) => warn!("Failed to remove old backup {:?}: {}", old, e),
        }
    }

    Ok(excess)
}

/// Refreshes query planner statistics and compacts the database file
#[instrument(skip(pool))]
pub fn run_maintenance(pool: &DbPool) -> Result<()> {
    let conn = &mut pool.get()?;
    conn.batch_execute("PRAGMA optimize; ANALYZE; VACUUM;")
        .context("Database maintenance failed")?;
    info!("Database maintenance completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::{create_test_user, setup_test_db};
    use tempfile::tempdir;

    #[test]
    fn test_backup_creates_file_and_prunes() {
        let pool = setup_test_db();
        create_test_user(&pool, "owner@example.com");
        let dir = tempdir().unwrap();

        let mut written = Vec::new();
        for _ in 0..3 {
            written.push(backup_database(&pool, dir.path(), 2).unwrap());
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let remaining = list_backups(dir.path()).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(!written[0].exists(), "oldest backup is pruned");
        assert_eq!(remaining.last(), written.last());
        assert!(fs::metadata(&written[2]).unwrap().len() > 0);
    }

    #[test]
    fn test_backup_with_zero_keep_retains_new_file() {
        let pool = setup_test_db();
        let dir = tempdir().unwrap();

        let first = backup_database(&pool, dir.path(), 0).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = backup_database(&pool, dir.path(), 0).unwrap();

        assert!(second.exists());
        assert!(!first.exists());
        assert_eq!(list_backups(dir.path()).unwrap(), vec![second]);
    }

    #[test]
    fn test_prune_ignores_foreign_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        fs::write(dir.path().join("cardwise-20240101-000000000.db"), "").unwrap();

        assert_eq!(prune_backups(dir.path(), 0).unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_run_maintenance() {
        let pool = setup_test_db();
        assert!(run_maintenance(&pool).is_ok());
    }
}
