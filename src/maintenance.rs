//! 404-log maintenance.
//!
//! Bulk-removes log entries that carry no actionable signal: URLs that
//! already have a non-regex redirection, and requests for well-known
//! infrastructure, admin, or asset paths (`/.well-known/*`, `*.php*`,
//! `*.js.map*`, `*admin*` by default). Zero removed rows is a normal
//! outcome.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// `WHERE` clause and its bind values, or `None` when nothing is purgeable.
fn purge_predicate(config: &Config) -> Option<(String, Vec<&str>)> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if config.maintenance.purge_redirected {
        clauses.push(format!(
            "url IN (SELECT url FROM {} WHERE regex = 0)",
            config.db.table("redirection_items")
        ));
    }
    for pattern in &config.maintenance.purge_patterns {
        clauses.push("url LIKE ?".to_string());
        binds.push(pattern.as_str());
    }

    if clauses.is_empty() {
        None
    } else {
        Some((clauses.join(" OR "), binds))
    }
}

/// Count the entries a purge would remove.
pub async fn count_purgeable(pool: &SqlitePool, config: &Config) -> Result<u64> {
    let Some((predicate, binds)) = purge_predicate(config) else {
        return Ok(0);
    };
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        config.db.table("redirection_404"),
        predicate
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for value in binds {
        query = query.bind(value);
    }
    let count = query.fetch_one(pool).await?;
    Ok(count as u64)
}

/// Delete purgeable entries and return how many were removed.
pub async fn purge_404(pool: &SqlitePool, config: &Config) -> Result<u64> {
    let Some((predicate, binds)) = purge_predicate(config) else {
        return Ok(0);
    };
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        config.db.table("redirection_404"),
        predicate
    );
    let mut query = sqlx::query(&sql);
    for value in binds {
        query = query.bind(value);
    }
    let result = query.execute(pool).await?;
    tracing::info!(deleted = result.rows_affected(), "purged 404 log");
    Ok(result.rows_affected())
}

/// Run `rdx purge-404`.
pub async fn run_purge(config: &Config, dry_run: bool) -> Result<()> {
    let pool = db::open(config).await?;

    if dry_run {
        let n = count_purgeable(&pool, config).await?;
        println!("Would delete {} 404 log entr{}.", n, plural_entries(n));
    } else {
        let n = purge_404(&pool, config).await?;
        println!("Deleted {} 404 log entr{}.", n, plural_entries(n));
    }

    pool.close().await;
    Ok(())
}

fn plural_entries(n: u64) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
