//! Top 404 errors from bots.
//!
//! Crawlers hitting dead URLs are the strongest hint that a redirection is
//! missing. Entries are attributed to a bot by user agent (`LIKE` patterns)
//! or by crawler IP range, grouped by URL, and ranked by hit count.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlHits {
    pub hits: i64,
    pub url: String,
}

/// Most-hit 404 URLs requested by bots, highest first.
pub async fn top_bot_404s(pool: &SqlitePool, config: &Config, limit: i64) -> Result<Vec<UrlHits>> {
    let reports = &config.reports;
    let mut clauses = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    for pattern in &reports.bot_agent_patterns {
        clauses.push("agent LIKE ?");
        binds.push(pattern.clone());
    }
    for prefix in &reports.bot_ip_prefixes {
        clauses.push("ip LIKE ?");
        binds.push(format!("{}%", prefix));
    }
    if clauses.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT COUNT(*) AS hits, url FROM {} WHERE {} \
         GROUP BY url ORDER BY hits DESC, url ASC LIMIT ?",
        config.db.table("redirection_404"),
        clauses.join(" OR ")
    );
    let mut query = sqlx::query(&sql);
    for value in &binds {
        query = query.bind(value.as_str());
    }
    let rows = query.bind(limit).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| UrlHits {
            hits: row.get("hits"),
            url: row.get("url"),
        })
        .collect())
}

/// Run `rdx top-404`.
pub async fn run_top_404(config: &Config, limit: Option<i64>, json: bool) -> Result<()> {
    let limit = limit.unwrap_or(config.reports.top_limit);
    if limit < 1 {
        anyhow::bail!("--limit must be >= 1");
    }

    let pool = db::open(config).await?;
    let rows = top_bot_404s(&pool, config, limit).await?;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No 404 errors from bots.");
        return Ok(());
    }

    println!("{:>6}  URL", "HITS");
    for r in &rows {
        println!("{:>6}  {}", r.hits, r.url);
    }
    Ok(())
}
