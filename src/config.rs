//! Configuration parsing and validation.
//!
//! Redirection Extended is configured via a TOML file (default
//! `config/rdx.toml`). Every section is optional; missing keys fall back to
//! the defaults below, which mirror the Redirection plugin's conventions.
//!
//! ```toml
//! [db]
//! path = "./data/redirection.sqlite"
//! table_prefix = "wp_"
//!
//! [validate]
//! filter_existing_slugs = true
//! filter_existing_redirects = true
//! encodings = ["utf-8", "iso-8859-1", "iso-8859-15", "windows-1252"]
//! allowed_extensions = ["csv", "txt"]
//! output = "validated_redirections.csv"
//!
//! [reports]
//! bot_agent_patterns = ["%bot%"]
//! bot_ip_prefixes = ["66.249"]
//! top_limit = 10
//!
//! [maintenance]
//! purge_redirected = true
//! purge_patterns = ["/.well-known/%", "%.php%", "%.js.map%", "%admin%"]
//! ```

use anyhow::{Context, Result};
use redirection_core::encoding::{SourceEncoding, DEFAULT_ENCODINGS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Prepended to every table name, like WordPress's `$wpdb->prefix`.
    #[serde(default)]
    pub table_prefix: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            table_prefix: String::new(),
        }
    }
}

impl DbConfig {
    /// Fully prefixed table name.
    pub fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/redirection.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidateConfig {
    #[serde(default)]
    pub filter_existing_slugs: bool,
    #[serde(default)]
    pub filter_existing_redirects: bool,
    #[serde(default = "default_encodings")]
    pub encodings: Vec<SourceEncoding>,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            filter_existing_slugs: false,
            filter_existing_redirects: false,
            encodings: default_encodings(),
            allowed_extensions: default_allowed_extensions(),
            output: default_output(),
        }
    }
}

fn default_encodings() -> Vec<SourceEncoding> {
    DEFAULT_ENCODINGS.to_vec()
}
fn default_allowed_extensions() -> Vec<String> {
    vec!["csv".to_string(), "txt".to_string()]
}
fn default_output() -> PathBuf {
    PathBuf::from("validated_redirections.csv")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// SQL `LIKE` patterns matched against the user agent.
    #[serde(default = "default_bot_agent_patterns")]
    pub bot_agent_patterns: Vec<String>,
    /// IP prefixes of known crawlers (66.249 is Googlebot).
    #[serde(default = "default_bot_ip_prefixes")]
    pub bot_ip_prefixes: Vec<String>,
    #[serde(default = "default_top_limit")]
    pub top_limit: i64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            bot_agent_patterns: default_bot_agent_patterns(),
            bot_ip_prefixes: default_bot_ip_prefixes(),
            top_limit: default_top_limit(),
        }
    }
}

fn default_bot_agent_patterns() -> Vec<String> {
    vec!["%bot%".to_string()]
}
fn default_bot_ip_prefixes() -> Vec<String> {
    vec!["66.249".to_string()]
}
fn default_top_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceConfig {
    /// Also purge 404 entries whose URL is already a non-regex redirect source.
    #[serde(default = "default_true")]
    pub purge_redirected: bool,
    /// SQL `LIKE` patterns for infrastructure, admin and asset noise.
    #[serde(default = "default_purge_patterns")]
    pub purge_patterns: Vec<String>,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            purge_redirected: true,
            purge_patterns: default_purge_patterns(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_purge_patterns() -> Vec<String> {
    ["/.well-known/%", "%.php%", "%.js.map%", "%admin%"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Table names are interpolated into SQL.
    if !config
        .db
        .table_prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!(
            "db.table_prefix may only contain ASCII letters, digits, and '_' (got '{}')",
            config.db.table_prefix
        );
    }

    if config.validate.encodings.is_empty() {
        anyhow::bail!("validate.encodings must list at least one encoding");
    }

    if config.validate.allowed_extensions.is_empty() {
        anyhow::bail!("validate.allowed_extensions must list at least one extension");
    }

    if config.reports.top_limit < 1 {
        anyhow::bail!("reports.top_limit must be >= 1");
    }

    Ok(())
}
