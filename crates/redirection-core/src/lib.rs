//! # Redirection Core
//!
//! Shared, I/O-free logic for Redirection Extended: the redirect data model,
//! URL path canonicalization, CSV row normalization, and the reference-set
//! abstraction used for conflict detection.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Rows arrive as
//! already-split byte fields; reference sets arrive as immutable snapshots.

pub mod canonical;
pub mod encoding;
pub mod models;
pub mod normalize;
pub mod reference;
