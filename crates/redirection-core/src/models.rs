//! Core data models for the redirect normalization pipeline.
//!
//! Rows flow in as [`RawRow`]s, and each surviving row leaves the
//! normalizer as exactly one [`RowOutcome`]: an accepted [`CandidatePair`]
//! or a [`Rejection`] tagged with its [`RejectionReason`].

use std::fmt;

use serde::Serialize;

/// One record as split by the input provider, before any repair.
///
/// Fields are raw bytes because the source encoding is unknown until
/// the encoding repair step runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source where this record starts.
    pub line_number: u64,
    pub fields: Vec<Vec<u8>>,
}

impl RawRow {
    pub fn new(line_number: u64, fields: Vec<Vec<u8>>) -> Self {
        Self {
            line_number,
            fields,
        }
    }

    /// Build a row from string fields.
    pub fn from_strs(line_number: u64, fields: &[&str]) -> Self {
        Self::new(
            line_number,
            fields.iter().map(|f| f.as_bytes().to_vec()).collect(),
        )
    }

    /// Number an arbitrary field sequence 1..n.
    ///
    /// For callers that have no physical line information.
    pub fn numbered<I>(records: I) -> impl Iterator<Item = RawRow>
    where
        I: IntoIterator<Item = Vec<Vec<u8>>>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(i, fields)| RawRow::new(i as u64 + 1, fields))
    }
}

/// A validated `before -> after` redirect ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidatePair {
    pub before: String,
    pub after: String,
    pub line_number: u64,
}

/// Why a row was rejected. The first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    ContainsWhitespace,
    IdenticalBeforeAfter,
    BeforeIsRoot,
    DiffersOnlyByTrailingSlash,
    MatchesExistingSlug,
    MatchesExistingRedirect,
}

impl RejectionReason {
    /// Stable snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContainsWhitespace => "contains_whitespace",
            Self::IdenticalBeforeAfter => "identical_before_after",
            Self::BeforeIsRoot => "before_is_root",
            Self::DiffersOnlyByTrailingSlash => "differs_only_by_trailing_slash",
            Self::MatchesExistingSlug => "matches_existing_slug",
            Self::MatchesExistingRedirect => "matches_existing_redirect",
        }
    }

    /// Human-readable explanation for diagnostic output.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ContainsWhitespace => "contains whitespace",
            Self::IdenticalBeforeAfter => "source and target are identical",
            Self::BeforeIsRoot => "source is the site root",
            Self::DiffersOnlyByTrailingSlash => "source and target differ only by a trailing slash",
            Self::MatchesExistingSlug => "source matches an existing content URL",
            Self::MatchesExistingRedirect => "source matches an existing redirection",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected row: where, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    #[serde(rename = "line")]
    pub line_number: u64,
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line_number, self.reason.message())
    }
}

/// Result of running one surviving row through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(CandidatePair),
    Rejected(Rejection),
}

/// Switches for a normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Reject sources that are already published content URLs.
    pub filter_existing_slugs: bool,
    /// Reject sources that already have an active redirection.
    pub filter_existing_redirects: bool,
    /// Surface rejections instead of accepted pairs.
    pub report_errors: bool,
}
