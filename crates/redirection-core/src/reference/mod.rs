//! Reference sets used for conflict detection.
//!
//! The normalizer never fetches anything itself. Callers take a snapshot
//! of the site's published paths and active redirect sources through a
//! [`ReferenceSource`] once per run and hand the immutable sets in.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::canonical::toggle_trailing_slash;

/// Every published content path, in both trailing-slash forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSlugSet {
    paths: HashSet<String>,
}

impl ReferenceSlugSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path together with its trailing-slash-toggled form.
    ///
    /// A missing leading `/` is added so the set lines up with
    /// canonicalized sources.
    pub fn insert(&mut self, path: &str) {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        if let Some(toggled) = toggle_trailing_slash(&path) {
            self.paths.insert(toggled);
        }
        self.paths.insert(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceSlugSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path.as_ref());
        }
        set
    }
}

/// Source paths of every enabled, non-regex redirection.
///
/// Stored exactly as configured; no slash toggling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRedirectSet {
    sources: HashSet<String>,
}

impl ReferenceRedirectSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: &str) {
        self.sources.insert(source.to_string());
    }

    pub fn contains(&self, source: &str) -> bool {
        self.sources.contains(source)
    }

    /// The configured source colliding with `path`, if any.
    ///
    /// Unlike [`contains`](Self::contains) this also checks the
    /// trailing-slash-toggled form, for editor-facing collision notices.
    pub fn collision(&self, path: &str) -> Option<&str> {
        if let Some(hit) = self.sources.get(path) {
            return Some(hit.as_str());
        }
        toggle_trailing_slash(path)
            .and_then(|toggled| self.sources.get(&toggled))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceRedirectSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for source in iter {
            set.insert(source.as_ref());
        }
        set
    }
}

/// Read-only snapshots of both reference sets, fixed for one run.
#[derive(Debug, Clone, Default)]
pub struct References {
    pub slugs: ReferenceSlugSet,
    pub redirects: ReferenceRedirectSet,
}

/// Abstract provider of reference sets.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`existing_slugs`](ReferenceSource::existing_slugs) | Published content paths |
/// | [`active_redirect_sources`](ReferenceSource::active_redirect_sources) | Enabled non-regex redirect sources |
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Snapshot every published content path.
    async fn existing_slugs(&self) -> Result<ReferenceSlugSet>;

    /// Snapshot every enabled, non-regex redirect source.
    async fn active_redirect_sources(&self) -> Result<ReferenceRedirectSet>;
}

/// Take the snapshots a run needs. Sets whose filter is off stay empty
/// and their source is never queried.
pub async fn snapshot(
    source: &dyn ReferenceSource,
    want_slugs: bool,
    want_redirects: bool,
) -> Result<References> {
    let slugs = if want_slugs {
        source.existing_slugs().await?
    } else {
        ReferenceSlugSet::new()
    };
    let redirects = if want_redirects {
        source.active_redirect_sources().await?
    } else {
        ReferenceRedirectSet::new()
    };
    Ok(References { slugs, redirects })
}
