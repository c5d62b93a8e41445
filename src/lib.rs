//! # Redirection Extended
//!
//! Bulk redirect validation and 404-log maintenance for sites running the
//! Redirection plugin.
//!
//! The heart of the crate is the CSV normalization pipeline from
//! [`redirection_core`]: it repairs, canonicalizes and checks every
//! `before,after` row of an uploaded file, and either exports the clean
//! pairs or reports why each rejected line was rejected. This crate supplies
//! everything around it: configuration, the SQLite store holding existing
//! redirections, published content paths and the 404 log, and the `rdx` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌───────────────┐
//! │ CSV input │──▶│    Normalizer    │──▶│ export (CSV)  │
//! │ (stream)  │   │ repair+canonical │   │ / diagnostics │
//! └───────────┘   └────────▲─────────┘   └───────────────┘
//!                          │ snapshots
//!              ┌───────────┴───────────┐
//!              │        SQLite         │◀── purge-404 / top-404 / stats
//!              │ items · 404 · content │
//!              └───────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rdx init                                   # create database
//! rdx validate redirects.csv                 # write validated_redirections.csv
//! rdx validate redirects.csv --report-errors --filter-slugs --filter-redirects
//! rdx purge-404 --dry-run
//! rdx top-404 --limit 20
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`input`] | Upload preconditions and streaming CSV rows |
//! | [`validate`] | Validation run: snapshots → normalize → export/diagnostics |
//! | [`export`] | Two-column CSV writer |
//! | [`sqlite_refs`] | SQLite-backed reference sets |
//! | [`maintenance`] | 404-log purge |
//! | [`report`] | Top 404 errors from bots |
//! | [`notice`] | Slug-collision notice |
//! | [`stats`] | Database overview |

pub mod config;
pub mod db;
pub mod export;
pub mod input;
pub mod maintenance;
pub mod migrate;
pub mod notice;
pub mod report;
pub mod sqlite_refs;
pub mod stats;
pub mod validate;

pub use redirection_core::models::{CandidatePair, NormalizeOptions, RawRow, Rejection, RejectionReason};
pub use redirection_core::{canonical, normalize, reference};
