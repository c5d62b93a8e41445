//! In-memory [`ReferenceSource`] implementation for testing and embedding.
//!
//! Holds plain path lists and counts how often each set is requested, so
//! callers can assert that unused sets are never fetched.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use super::{ReferenceRedirectSet, ReferenceSlugSet, ReferenceSource};

/// In-memory reference source.
#[derive(Default)]
pub struct InMemoryReferences {
    slugs: Vec<String>,
    redirects: Vec<String>,
    slug_queries: AtomicUsize,
    redirect_queries: AtomicUsize,
}

impl InMemoryReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slugs<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slugs.extend(slugs.into_iter().map(Into::into));
        self
    }

    pub fn with_redirects<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redirects.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Number of times [`existing_slugs`](ReferenceSource::existing_slugs) ran.
    pub fn slug_queries(&self) -> usize {
        self.slug_queries.load(Ordering::Relaxed)
    }

    /// Number of times [`active_redirect_sources`](ReferenceSource::active_redirect_sources) ran.
    pub fn redirect_queries(&self) -> usize {
        self.redirect_queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ReferenceSource for InMemoryReferences {
    async fn existing_slugs(&self) -> Result<ReferenceSlugSet> {
        self.slug_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.slugs.iter().collect())
    }

    async fn active_redirect_sources(&self) -> Result<ReferenceRedirectSet> {
        self.redirect_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.redirects.iter().collect())
    }
}
