use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Create the schema. Idempotent.
///
/// Column names follow the Redirection plugin so an exported WordPress
/// database can be pointed at directly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let items = config.db.table("redirection_items");
    let log = config.db.table("redirection_404");
    let content = config.db.table("content_paths");

    // Configured redirections
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {items} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            match_url TEXT,
            action_data TEXT,
            action_code INTEGER NOT NULL DEFAULT 301,
            regex INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'enabled',
            last_access INTEGER
        )
        "#
    ))
    .execute(&pool)
    .await?;

    // 404 log
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {log} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created INTEGER NOT NULL,
            url TEXT NOT NULL,
            agent TEXT,
            referrer TEXT,
            ip TEXT
        )
        "#
    ))
    .execute(&pool)
    .await?;

    // Published content inventory
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {content} (
            path TEXT PRIMARY KEY,
            kind TEXT NOT NULL DEFAULT 'page'
        )
        "#
    ))
    .execute(&pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{items}_url ON {items}(url)"
    ))
    .execute(&pool)
    .await?;
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{log}_url ON {log}(url)"
    ))
    .execute(&pool)
    .await?;
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{log}_created ON {log}(created DESC)"
    ))
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
