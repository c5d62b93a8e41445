//! Database statistics overview.
//!
//! A quick summary of what the validator compares against: redirection
//! counts, the content inventory size, and the 404 log's volume and
//! freshness. Used by `rdx stats`.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub redirects_total: i64,
    pub redirects_enabled: i64,
    pub redirects_regex: i64,
    pub content_paths: i64,
    pub log_entries: i64,
    pub last_404_ts: Option<i64>,
}

pub async fn collect_stats(pool: &SqlitePool, config: &Config) -> Result<Stats> {
    let items = config.db.table("redirection_items");
    let log = config.db.table("redirection_404");
    let content = config.db.table("content_paths");

    let row = sqlx::query(&format!(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN status = 'enabled' THEN 1 ELSE 0 END), 0) AS enabled,
            COALESCE(SUM(CASE WHEN regex != 0 THEN 1 ELSE 0 END), 0) AS regex
        FROM {items}
        "#
    ))
    .fetch_one(pool)
    .await?;

    let content_paths: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {content}"))
        .fetch_one(pool)
        .await?;

    let log_row = sqlx::query(&format!(
        "SELECT COUNT(*) AS entries, MAX(created) AS last FROM {log}"
    ))
    .fetch_one(pool)
    .await?;

    Ok(Stats {
        redirects_total: row.get("total"),
        redirects_enabled: row.get("enabled"),
        redirects_regex: row.get("regex"),
        content_paths,
        log_entries: log_row.get("entries"),
        last_404_ts: log_row.get("last"),
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::open(config).await?;
    let stats = collect_stats(&pool, config).await?;
    pool.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Redirection Extended: Database Stats");
    println!("=====================================");
    println!();
    println!("  Database:      {}", config.db.path.display());
    println!("  Size:          {}", format_bytes(db_size));
    println!();
    println!(
        "  Redirections:  {} ({} enabled, {} regex)",
        stats.redirects_total, stats.redirects_enabled, stats.redirects_regex
    );
    println!("  Content URLs:  {}", stats.content_paths);
    println!("  404 entries:   {}", stats.log_entries);
    println!(
        "  Last 404:      {}",
        match stats.last_404_ts {
            Some(ts) => format_ts_relative(ts),
            None => "never".to_string(),
        }
    );
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp relative to now (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_ts_relative() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_ts_relative(now), "just now");
        assert_eq!(format_ts_relative(now - 7200), "2 hours ago");
        assert_eq!(format_ts_relative(now - 86400), "1 day ago");
        assert_eq!(format_ts_relative(0), "1970-01-01 00:00");
    }
}
