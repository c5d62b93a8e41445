//! Bulk redirect validation.
//!
//! Coordinates one validation run: precondition checks → reference
//! snapshots → streaming normalization → export or diagnostics.
//! Reference sets are only loaded, and the database only opened, when a
//! conflict filter is requested.

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use redirection_core::models::{NormalizeOptions, RawRow, Rejection};
use redirection_core::normalize::{NormalizeOutput, Normalization, Normalizer};
use redirection_core::reference::{snapshot, References};

use crate::config::Config;
use crate::db;
use crate::export;
use crate::input::CsvRows;
use crate::sqlite_refs::SqliteReferences;

/// Command-line switches for `rdx validate`. Filters are OR-ed with the
/// config file's `[validate]` defaults.
#[derive(Debug, Clone, Default)]
pub struct ValidateArgs {
    pub input: PathBuf,
    pub report_errors: bool,
    pub filter_slugs: bool,
    pub filter_redirects: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
}

impl ValidateArgs {
    pub fn options(&self, config: &Config) -> NormalizeOptions {
        NormalizeOptions {
            filter_existing_slugs: self.filter_slugs || config.validate.filter_existing_slugs,
            filter_existing_redirects: self.filter_redirects
                || config.validate.filter_existing_redirects,
            report_errors: self.report_errors,
        }
    }
}

#[derive(Serialize)]
struct DiagnosticEntry<'a> {
    line: u64,
    reason: &'a str,
    message: &'a str,
}

/// Snapshot the reference sets the enabled filters need.
pub async fn load_references(config: &Config, options: NormalizeOptions) -> Result<References> {
    if !options.filter_existing_slugs && !options.filter_existing_redirects {
        return Ok(References::default());
    }

    let pool = db::open(config).await?;
    let source = SqliteReferences::new(pool, &config.db);
    let refs = snapshot(
        &source,
        options.filter_existing_slugs,
        options.filter_existing_redirects,
    )
    .await?;
    source.pool().close().await;
    Ok(refs)
}

/// Normalize a row stream with the configured encoding preferences.
pub fn validate_rows<I>(
    config: &Config,
    options: NormalizeOptions,
    refs: &References,
    rows: I,
) -> Normalization
where
    I: IntoIterator<Item = RawRow>,
{
    Normalizer::new(options, &refs.slugs, &refs.redirects)
        .with_encodings(&config.validate.encodings)
        .run(rows)
}

/// Validate a CSV file end to end and return both projections.
pub async fn validate_file(
    config: &Config,
    input: &Path,
    options: NormalizeOptions,
) -> Result<Normalization> {
    let mut rows = CsvRows::open(input, &config.validate.allowed_extensions)?;
    let refs = load_references(config, options).await?;

    let result = validate_rows(config, options, &refs, &mut rows);
    rows.finish()?;

    info!(
        input = %input.display(),
        rows = result.rows_read,
        accepted = result.accepted.len(),
        rejected = result.rejections.len(),
        skipped = result.skipped(),
        "validation finished"
    );
    Ok(result)
}

pub async fn run_validate(config: &Config, args: &ValidateArgs) -> Result<()> {
    let options = args.options(config);
    let result = validate_file(config, &args.input, options).await?;

    match result.into_output(options.report_errors) {
        NormalizeOutput::Accepted(pairs) => {
            if pairs.is_empty() {
                bail!("No valid redirections found in {}", args.input.display());
            }
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| config.validate.output.clone());
            export::export_pairs(&output, &pairs)?;
        }
        NormalizeOutput::Diagnostics(rejections) => {
            print_diagnostics(&rejections, args.json)?;
        }
    }

    Ok(())
}

fn print_diagnostics(rejections: &[Rejection], json: bool) -> Result<()> {
    if json {
        let entries: Vec<DiagnosticEntry> = rejections
            .iter()
            .map(|r| DiagnosticEntry {
                line: r.line_number,
                reason: r.reason.as_str(),
                message: r.reason.message(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        if rejections.is_empty() {
            eprintln!("No errors found.");
        }
        return Ok(());
    }

    if rejections.is_empty() {
        println!("No errors found.");
        return Ok(());
    }

    let report: Vec<String> = rejections.iter().map(|r| r.to_string()).collect();
    println!("{}", report.join("\n"));
    eprintln!(
        "{} line{} rejected",
        rejections.len(),
        if rejections.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
