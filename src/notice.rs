//! Slug-collision notice.
//!
//! Warns editors when a page's own path is also the source of an active
//! redirection, which would make the page unreachable.

use anyhow::Result;

use redirection_core::canonical::canonicalize;
use redirection_core::reference::{ReferenceRedirectSet, ReferenceSource};

use crate::config::Config;
use crate::db;
use crate::sqlite_refs::SqliteReferences;

/// The redirect source that shadows `path`, if any.
pub fn find_collision(path: &str, redirects: &ReferenceRedirectSet) -> Option<String> {
    redirects.collision(&canonicalize(path)).map(str::to_string)
}

/// Run `rdx check-slug`.
pub async fn run_check_slug(config: &Config, path: &str) -> Result<()> {
    let pool = db::open(config).await?;
    let source = SqliteReferences::new(pool, &config.db);
    let redirects = source.active_redirect_sources().await?;
    source.pool().close().await;

    let canonical = canonicalize(path);
    match find_collision(path, &redirects) {
        Some(hit) => println!(
            "Warning: {} is also the source of an active redirection ({}). Visitors will be redirected away from this content.",
            canonical, hit
        ),
        None => println!("OK: no active redirection uses {}.", canonical),
    }
    Ok(())
}
