//! SQLite-backed [`ReferenceSource`] implementation.
//!
//! Reads the content inventory and the Redirection plugin's item table.
//! Only enabled, non-regex redirections count as existing sources: a regex
//! rule cannot be compared against a literal path.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use redirection_core::reference::{ReferenceRedirectSet, ReferenceSlugSet, ReferenceSource};

use crate::config::DbConfig;

/// SQLite implementation of the [`ReferenceSource`] trait.
pub struct SqliteReferences {
    pool: SqlitePool,
    content_table: String,
    items_table: String,
}

impl SqliteReferences {
    pub fn new(pool: SqlitePool, db: &DbConfig) -> Self {
        Self {
            pool,
            content_table: db.table("content_paths"),
            items_table: db.table("redirection_items"),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ReferenceSource for SqliteReferences {
    async fn existing_slugs(&self) -> Result<ReferenceSlugSet> {
        let paths: Vec<String> =
            sqlx::query_scalar(&format!("SELECT path FROM {}", self.content_table))
                .fetch_all(&self.pool)
                .await?;

        let slugs: ReferenceSlugSet = paths.iter().collect();
        tracing::debug!(paths = paths.len(), "loaded content inventory");
        Ok(slugs)
    }

    async fn active_redirect_sources(&self) -> Result<ReferenceRedirectSet> {
        let sources: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT url FROM {} WHERE status = 'enabled' AND regex = 0",
            self.items_table
        ))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(sources = sources.len(), "loaded active redirection sources");
        Ok(sources.iter().collect())
    }
}
