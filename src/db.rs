//! SQLite database connection management.
//!
//! The database mirrors the tables the Redirection plugin keeps in
//! WordPress (`redirection_items`, `redirection_404`) plus a flat
//! `content_paths` inventory of published URLs. WAL mode is enabled so a
//! long-running report never blocks the site's own writes.

use anyhow::{bail, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

/// Create a connection pool, creating the database file and its parent
/// directories if they don't exist. Used by `rdx init`.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    pool(config, true).await
}

/// Open an existing database. Fails with a hint when it is missing, so
/// read-only commands never leave an empty database behind.
pub async fn open(config: &Config) -> Result<SqlitePool> {
    if !config.db.path.exists() {
        bail!(
            "Database not found at {}. Run `rdx init` first.",
            config.db.path.display()
        );
    }
    pool(config, false).await
}

async fn pool(config: &Config, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.db.path.display()))?
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
