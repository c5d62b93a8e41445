//! # Redirection Extended CLI (`rdx`)
//!
//! ## Usage
//!
//! ```bash
//! rdx --config ./config/rdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rdx init` | Create the SQLite database and run schema migrations |
//! | `rdx validate <file>` | Validate a redirect CSV and export the clean pairs |
//! | `rdx check-slug <path>` | Warn if a content path is shadowed by a redirection |
//! | `rdx purge-404` | Delete redirected and noise entries from the 404 log |
//! | `rdx top-404` | List the 404 URLs most requested by bots |
//! | `rdx stats` | Show redirection, content, and 404 log counts |
//!
//! Set `RUST_LOG=debug` to see per-row rejection events on stderr.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use redirection_extended::config::{self, Config};
use redirection_extended::validate::ValidateArgs;
use redirection_extended::{maintenance, migrate, notice, report, stats, validate};

/// Redirection Extended CLI: validate bulk redirect CSVs and keep the
/// 404 log actionable.
#[derive(Parser)]
#[command(
    name = "rdx",
    about = "Redirection Extended: bulk redirect CSV validation and 404-log maintenance",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rdx.toml`. When the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/rdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the redirection_items,
    /// redirection_404, and content_paths tables. Safe to run repeatedly.
    Init,

    /// Validate a redirect CSV file.
    ///
    /// Each row is `before,after` (or `before;after`). Rows are repaired,
    /// canonicalized to site-relative paths, and checked. Valid pairs are
    /// exported without a header row; with `--report-errors`, the rejected
    /// lines are listed instead.
    Validate {
        /// CSV file to validate.
        file: PathBuf,

        /// List rejected lines and why, instead of exporting.
        #[arg(long)]
        report_errors: bool,

        /// Reject sources that are already published content URLs.
        #[arg(long)]
        filter_slugs: bool,

        /// Reject sources that already have an active redirection.
        #[arg(long)]
        filter_redirects: bool,

        /// Export destination (`-` for stdout). Defaults to `[validate].output`.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print diagnostics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check whether a content path is also an active redirection source.
    CheckSlug {
        /// Path or full URL of the content.
        path: String,
    },

    /// Purge the 404 log.
    ///
    /// Removes entries for URLs that already have a non-regex redirection,
    /// plus requests for infrastructure, admin, and asset paths.
    #[command(name = "purge-404")]
    Purge404 {
        /// Only count the entries that would be deleted.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the 404 URLs most requested by bots.
    #[command(name = "top-404")]
    Top404 {
        /// Maximum number of URLs. Defaults to `[reports].top_limit`.
        #[arg(long)]
        limit: Option<i64>,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show database statistics.
    Stats,
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::info!(config = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Validate {
            file,
            report_errors,
            filter_slugs,
            filter_redirects,
            output,
            json,
        } => {
            let args = ValidateArgs {
                input: file,
                report_errors,
                filter_slugs,
                filter_redirects,
                output,
                json,
            };
            validate::run_validate(&cfg, &args).await?;
        }
        Commands::CheckSlug { path } => {
            notice::run_check_slug(&cfg, &path).await?;
        }
        Commands::Purge404 { dry_run } => {
            maintenance::run_purge(&cfg, dry_run).await?;
        }
        Commands::Top404 { limit, json } => {
            report::run_top_404(&cfg, limit, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
