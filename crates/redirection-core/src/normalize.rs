//! Redirect CSV row normalization.
//!
//! Every row goes through the same fixed sequence of repairs and checks:
//!
//! | Step | Action |
//! |------|--------|
//! | 1 | Re-split a lone field on `;` |
//! | 2 | Drop rows with fewer than two fields |
//! | 3 | Drop a header on line 1 |
//! | 4 | Decode both fields (UTF-8, then legacy encodings) |
//! | 5 | Reject whitespace |
//! | 6 | Strip bytes outside printable ASCII |
//! | 7 | Canonicalize both paths |
//! | 8–12 | Reject identical, root, slash-only, known slug, known redirect |
//! | 13 | Accept |
//!
//! Steps 2 and 3 drop rows silently. Every other row yields exactly one
//! [`RowOutcome`]; the first failing check decides the rejection reason.
//! Rows are processed lazily, one at a time, in input order.

use tracing::debug;

use crate::canonical::{canonicalize, trim_trailing_slashes};
use crate::encoding::{decode_field, SourceEncoding, DEFAULT_ENCODINGS};
use crate::models::{
    CandidatePair, NormalizeOptions, RawRow, Rejection, RejectionReason, RowOutcome,
};
use crate::reference::{ReferenceRedirectSet, ReferenceSlugSet};

const HEADER_NAMES: [&str; 4] = ["before", "from", "source", "url"];

/// What a run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutput {
    /// Accepted pairs in input order. Empty means "no valid redirections".
    Accepted(Vec<CandidatePair>),
    /// Rejections in input order. Empty means "no errors found".
    Diagnostics(Vec<Rejection>),
}

/// Both projections of a run, plus counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalization {
    pub accepted: Vec<CandidatePair>,
    pub rejections: Vec<Rejection>,
    /// Rows read, including silently dropped ones.
    pub rows_read: u64,
}

impl Normalization {
    /// Keep the projection selected by `report_errors`.
    pub fn into_output(self, report_errors: bool) -> NormalizeOutput {
        if report_errors {
            NormalizeOutput::Diagnostics(self.rejections)
        } else {
            NormalizeOutput::Accepted(self.accepted)
        }
    }

    /// Rows dropped by the column gate or header detection.
    pub fn skipped(&self) -> u64 {
        self.rows_read - self.accepted.len() as u64 - self.rejections.len() as u64
    }
}

/// A configured normalization pass over borrowed reference snapshots.
pub struct Normalizer<'a> {
    options: NormalizeOptions,
    slugs: &'a ReferenceSlugSet,
    redirects: &'a ReferenceRedirectSet,
    encodings: &'a [SourceEncoding],
}

impl<'a> Normalizer<'a> {
    pub fn new(
        options: NormalizeOptions,
        slugs: &'a ReferenceSlugSet,
        redirects: &'a ReferenceRedirectSet,
    ) -> Self {
        Self {
            options,
            slugs,
            redirects,
            encodings: &DEFAULT_ENCODINGS,
        }
    }

    /// Override the encoding preference order used by the repair step.
    pub fn with_encodings(mut self, encodings: &'a [SourceEncoding]) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Run one row through steps 1–13.
    ///
    /// Returns `None` for rows dropped silently (too few columns, header).
    pub fn classify(&self, row: RawRow) -> Option<RowOutcome> {
        let line_number = row.line_number;
        let fields = repair_delimiter(row.fields);
        if fields.len() < 2 {
            return None;
        }
        if line_number == 1 && is_header(&fields[0]) {
            debug!(line = line_number, "skipping header row");
            return None;
        }

        let before = decode_field(&fields[0], self.encodings);
        let after = decode_field(&fields[1], self.encodings);

        let outcome = match self.check(before, after) {
            Ok((before, after)) => RowOutcome::Accepted(CandidatePair {
                before,
                after,
                line_number,
            }),
            Err(reason) => {
                debug!(line = line_number, reason = %reason, "row rejected");
                RowOutcome::Rejected(Rejection {
                    line_number,
                    reason,
                })
            }
        };
        Some(outcome)
    }

    fn check(
        &self,
        before: String,
        after: String,
    ) -> Result<(String, String), RejectionReason> {
        if before.chars().chain(after.chars()).any(is_ascii_space) {
            return Err(RejectionReason::ContainsWhitespace);
        }

        let before = canonicalize(&strip_non_printable(before));
        let after = canonicalize(&strip_non_printable(after));

        if before == after {
            return Err(RejectionReason::IdenticalBeforeAfter);
        }
        if before == "/" {
            return Err(RejectionReason::BeforeIsRoot);
        }
        if trim_trailing_slashes(&before) == trim_trailing_slashes(&after) {
            return Err(RejectionReason::DiffersOnlyByTrailingSlash);
        }
        if self.options.filter_existing_slugs && self.slugs.contains(&before) {
            return Err(RejectionReason::MatchesExistingSlug);
        }
        if self.options.filter_existing_redirects && self.redirects.contains(&before) {
            return Err(RejectionReason::MatchesExistingRedirect);
        }

        Ok((before, after))
    }

    /// Lazily classify a row stream.
    pub fn outcomes<I>(&'a self, rows: I) -> impl Iterator<Item = RowOutcome> + 'a
    where
        I: IntoIterator<Item = RawRow>,
        I::IntoIter: 'a,
    {
        rows.into_iter().filter_map(move |row| self.classify(row))
    }

    /// Consume a row stream, collecting both projections in one pass.
    pub fn run<I>(&self, rows: I) -> Normalization
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut result = Normalization::default();
        for row in rows {
            result.rows_read += 1;
            match self.classify(row) {
                Some(RowOutcome::Accepted(pair)) => result.accepted.push(pair),
                Some(RowOutcome::Rejected(rejection)) => result.rejections.push(rejection),
                None => {}
            }
        }
        result
    }
}

/// Normalize `rows` and return the projection selected by
/// `options.report_errors`.
pub fn normalize<I>(
    rows: I,
    options: NormalizeOptions,
    existing_slugs: &ReferenceSlugSet,
    existing_redirects: &ReferenceRedirectSet,
) -> NormalizeOutput
where
    I: IntoIterator<Item = RawRow>,
{
    Normalizer::new(options, existing_slugs, existing_redirects)
        .run(rows)
        .into_output(options.report_errors)
}

/// A single field holding `;` was most likely a semicolon-delimited line.
fn repair_delimiter(fields: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    if fields.len() == 1 && fields[0].contains(&b';') {
        fields[0].split(|b| *b == b';').map(<[u8]>::to_vec).collect()
    } else {
        fields
    }
}

fn is_header(first: &[u8]) -> bool {
    let value = String::from_utf8_lossy(first).trim().to_lowercase();
    HEADER_NAMES.contains(&value.as_str()) || value.contains(" url")
}

/// Space, tab, LF, VT, FF or CR. Other Unicode spaces fall to step 6.
fn is_ascii_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

fn strip_non_printable(mut value: String) -> String {
    value.retain(|c| (' '..='~').contains(&c));
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<RawRow> {
        lines
            .iter()
            .enumerate()
            .map(|(i, fields)| RawRow::from_strs(i as u64 + 1, fields))
            .collect()
    }

    fn run(lines: &[&[&str]]) -> Normalization {
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        Normalizer::new(NormalizeOptions::default(), &slugs, &redirects).run(rows(lines))
    }

    fn reasons(n: &Normalization) -> Vec<(u64, RejectionReason)> {
        n.rejections
            .iter()
            .map(|r| (r.line_number, r.reason))
            .collect()
    }

    #[test]
    fn test_simple_pair_accepted() {
        let n = run(&[&["/old-page", "/new-page"]]);
        assert_eq!(
            n.accepted,
            vec![CandidatePair {
                before: "/old-page".into(),
                after: "/new-page".into(),
                line_number: 1,
            }]
        );
        assert!(n.rejections.is_empty());
    }

    #[test]
    fn test_absolute_urls_are_stripped() {
        let n = run(&[&["https://example.com/a?x=1", "https://example.com/b"]]);
        assert_eq!(n.accepted[0].before, "/a?x=1");
        assert_eq!(n.accepted[0].after, "/b");
    }

    #[test]
    fn test_identical_rejected() {
        let n = run(&[&["/same", "/same"]]);
        assert_eq!(reasons(&n), vec![(1, RejectionReason::IdenticalBeforeAfter)]);
    }

    #[test]
    fn test_identical_after_canonicalization_rejected() {
        let n = run(&[&["same", "https://example.com/same"]]);
        assert_eq!(reasons(&n), vec![(1, RejectionReason::IdenticalBeforeAfter)]);
    }

    #[test]
    fn test_root_rejected() {
        let n = run(&[&["/", "/elsewhere"]]);
        assert_eq!(reasons(&n), vec![(1, RejectionReason::BeforeIsRoot)]);

        let n = run(&[&["https://example.com", "/elsewhere"]]);
        assert_eq!(reasons(&n), vec![(1, RejectionReason::BeforeIsRoot)]);
    }

    #[test]
    fn test_trailing_slash_only_rejected_both_ways() {
        let n = run(&[&["/a/", "/a"], &["/a", "/a/"]]);
        assert_eq!(
            reasons(&n),
            vec![
                (1, RejectionReason::DiffersOnlyByTrailingSlash),
                (2, RejectionReason::DiffersOnlyByTrailingSlash),
            ]
        );
        assert!(n.accepted.is_empty());
    }

    #[test]
    fn test_whitespace_rejected_before_anything_else() {
        // Would also be identical, but whitespace is checked first.
        let n = run(&[&["/a b", "/a b"], &["/x", "/y\t"], &["/v\x0bw", "/z"]]);
        assert_eq!(
            reasons(&n),
            vec![
                (1, RejectionReason::ContainsWhitespace),
                (2, RejectionReason::ContainsWhitespace),
                (3, RejectionReason::ContainsWhitespace),
            ]
        );
    }

    #[test]
    fn test_unicode_spaces_are_stripped_not_rejected() {
        let n = run(&[&["/a\u{a0}b", "/target"], &["/c\u{2003}d", "/target"]]);
        assert!(n.rejections.is_empty());
        let befores: Vec<&str> = n.accepted.iter().map(|p| p.before.as_str()).collect();
        assert_eq!(befores, vec!["/ab", "/cd"]);
    }

    #[test]
    fn test_latin1_spaces_are_stripped_not_rejected() {
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        let rows = [
            RawRow::new(1, vec![b"/a\xa0b".to_vec(), b"/target".to_vec()]),
            RawRow::new(2, vec![b"/c\x85d".to_vec(), b"/target".to_vec()]),
        ];
        let n = Normalizer::new(NormalizeOptions::default(), &slugs, &redirects).run(rows);
        assert!(n.rejections.is_empty());
        assert_eq!(n.accepted[0].before, "/ab");
        assert_eq!(n.accepted[1].before, "/cd");
    }

    #[test]
    fn test_relative_dot_segments_kept_verbatim() {
        let n = run(&[&["https://example.com/old/../new", "/new"]]);
        assert!(n.rejections.is_empty());
        assert_eq!(n.accepted[0].before, "/old/../new");
    }

    #[test]
    fn test_non_printable_bytes_stripped() {
        let n = run(&[&["/caf\u{e9}", "/new\u{7f}-page"]]);
        assert_eq!(n.accepted[0].before, "/caf");
        assert_eq!(n.accepted[0].after, "/new-page");
    }

    #[test]
    fn test_latin1_field_is_repaired_then_stripped() {
        let row = RawRow::new(1, vec![b"/caf\xe9".to_vec(), b"/menu".to_vec()]);
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        let n = Normalizer::new(NormalizeOptions::default(), &slugs, &redirects).run([row]);
        assert_eq!(n.accepted[0].before, "/caf");
    }

    #[test]
    fn test_semicolon_row_is_resplit() {
        let n = run(&[&["/old;/new"]]);
        assert_eq!(n.accepted[0].before, "/old");
        assert_eq!(n.accepted[0].after, "/new");
    }

    #[test]
    fn test_short_rows_dropped_silently() {
        let n = run(&[&["/lonely"], &[""], &["/a", "/b"]]);
        assert!(n.rejections.is_empty());
        assert_eq!(n.accepted.len(), 1);
        assert_eq!(n.accepted[0].line_number, 3);
        assert_eq!(n.skipped(), 2);
    }

    #[test]
    fn test_header_variants_skipped() {
        for header in ["URL", "Before", " from ", "Source", "Old URL", "source url"] {
            let n = run(&[&[header, "Destination"], &["/a", "/b"]]);
            assert!(n.rejections.is_empty(), "header {header:?} was rejected");
            assert_eq!(n.accepted.len(), 1, "header {header:?} was accepted");
        }
    }

    #[test]
    fn test_header_only_detected_on_line_one() {
        let n = run(&[&["/a", "/b"], &["url", "destination"]]);
        assert_eq!(n.accepted.len(), 2);
        assert_eq!(n.accepted[1].before, "/url");
    }

    #[test]
    fn test_existing_slug_filter() {
        let slugs: ReferenceSlugSet = ["/existing"].into_iter().collect();
        let redirects = ReferenceRedirectSet::new();
        let options = NormalizeOptions {
            filter_existing_slugs: true,
            ..Default::default()
        };
        let n = Normalizer::new(options, &slugs, &redirects)
            .run(rows(&[&["/existing", "/new"], &["/existing/", "/new"]]));
        assert_eq!(
            reasons(&n),
            vec![
                (1, RejectionReason::MatchesExistingSlug),
                (2, RejectionReason::MatchesExistingSlug),
            ]
        );
    }

    #[test]
    fn test_slug_filter_off_ignores_slugs() {
        let slugs: ReferenceSlugSet = ["/existing"].into_iter().collect();
        let redirects = ReferenceRedirectSet::new();
        let n = Normalizer::new(NormalizeOptions::default(), &slugs, &redirects)
            .run(rows(&[&["/existing", "/new"]]));
        assert_eq!(n.accepted.len(), 1);
    }

    #[test]
    fn test_existing_redirect_filter() {
        let slugs: ReferenceSlugSet = ["/taken"].into_iter().collect();
        let redirects: ReferenceRedirectSet = ["/taken", "/moved"].into_iter().collect();
        let options = NormalizeOptions {
            filter_existing_slugs: true,
            filter_existing_redirects: true,
            report_errors: true,
        };
        let n = Normalizer::new(options, &slugs, &redirects)
            .run(rows(&[&["/taken", "/x"], &["/moved", "/x"], &["/fresh", "/x"]]));
        // The slug check runs first.
        assert_eq!(
            reasons(&n),
            vec![
                (1, RejectionReason::MatchesExistingSlug),
                (2, RejectionReason::MatchesExistingRedirect),
            ]
        );
        assert_eq!(n.accepted.len(), 1);
    }

    #[test]
    fn test_output_projection() {
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        let input = || rows(&[&["/a", "/b"], &["/c", "/c"]]);

        let accepted = normalize(input(), NormalizeOptions::default(), &slugs, &redirects);
        match accepted {
            NormalizeOutput::Accepted(pairs) => assert_eq!(pairs.len(), 1),
            other => panic!("expected accepted pairs, got {:?}", other),
        }

        let options = NormalizeOptions {
            report_errors: true,
            ..Default::default()
        };
        let diagnostics = normalize(input(), options, &slugs, &redirects);
        assert_eq!(
            diagnostics,
            NormalizeOutput::Diagnostics(vec![Rejection {
                line_number: 2,
                reason: RejectionReason::IdenticalBeforeAfter,
            }])
        );
    }

    #[test]
    fn test_clean_input_has_no_diagnostics() {
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        let options = NormalizeOptions {
            report_errors: true,
            ..Default::default()
        };
        let out = normalize(rows(&[&["/a", "/b"]]), options, &slugs, &redirects);
        assert_eq!(out, NormalizeOutput::Diagnostics(vec![]));
    }

    #[test]
    fn test_deterministic() {
        let input: &[&[&str]] = &[
            &["/a", "/a/"],
            &["/", "/x"],
            &["/q r", "/s"],
            &["/same", "/same"],
            &["/ok", "/fine"],
        ];
        assert_eq!(reasons(&run(input)), reasons(&run(input)));
    }

    #[test]
    fn test_accepted_pairs_hold_invariants() {
        let input: &[&[&str]] = &[
            &["old", "new"],
            &["https://example.com/x?y=1#z", "/x"],
            &["/\u{e9}t\u{e9}", "/summer"],
            &["/a\u{1}b", "/c"],
            &["http://[bad", "/d"],
        ];
        for pair in run(input).accepted {
            assert_ne!(pair.before, pair.after);
            assert_ne!(pair.before, "/");
            assert!(pair.before.starts_with('/') && pair.after.starts_with('/'));
            for s in [&pair.before, &pair.after] {
                assert!(s.bytes().all(|b| (0x20..=0x7e).contains(&b) && b != b' '));
            }
            assert_ne!(
                trim_trailing_slashes(&pair.before),
                trim_trailing_slashes(&pair.after)
            );
        }
    }

    #[test]
    fn test_outcomes_are_lazy() {
        let slugs = ReferenceSlugSet::new();
        let redirects = ReferenceRedirectSet::new();
        let normalizer = Normalizer::new(NormalizeOptions::default(), &slugs, &redirects);
        let endless = (1..).map(|i| RawRow::from_strs(i, &["/a", "/b"]));
        let first: Vec<RowOutcome> = normalizer.outcomes(endless).take(3).collect();
        assert_eq!(first.len(), 3);
    }
}
