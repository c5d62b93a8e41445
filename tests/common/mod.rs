#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use redirection_extended::config::{self, Config};
use redirection_extended::{db, migrate};

pub struct TestEnv {
    pub tmp: TempDir,
    pub config_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();

        let config_dir = root.join("config");
        fs::create_dir_all(&config_dir).unwrap();

        let config_content = format!(
            r#"[db]
path = "{}/data/redirection.sqlite"
table_prefix = "{}"

[validate]
output = "{}/out/validated_redirections.csv"
"#,
            root.display(),
            prefix,
            root.display()
        );

        let config_path = config_dir.join("rdx.toml");
        fs::write(&config_path, config_content).unwrap();

        Self { tmp, config_path }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn config(&self) -> Config {
        config::load_config(&self.config_path).unwrap()
    }

    pub fn output_path(&self) -> PathBuf {
        self.root().join("out").join("validated_redirections.csv")
    }

    pub fn write_csv(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Run the `rdx` binary with this env's config.
    pub fn run(&self, args: &[&str]) -> (String, String, bool) {
        let binary = env!("CARGO_BIN_EXE_rdx");
        let output = Command::new(binary)
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("Failed to run rdx binary at {:?}: {}", binary, e));

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        (stdout, stderr, output.status.success())
    }

    /// Create the schema and load fixtures.
    pub fn seed(&self, fixtures: &Fixtures) {
        let config = self.config();
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(seed(&config, fixtures));
    }
}

/// A redirection row: source, regex flag, status.
pub struct Item {
    pub url: &'static str,
    pub regex: bool,
    pub status: &'static str,
}

pub fn enabled(url: &'static str) -> Item {
    Item {
        url,
        regex: false,
        status: "enabled",
    }
}

/// A 404 log row: url, agent, ip.
pub type Hit = (&'static str, &'static str, &'static str);

#[derive(Default)]
pub struct Fixtures {
    pub items: Vec<Item>,
    pub content: Vec<&'static str>,
    pub hits: Vec<Hit>,
}

pub async fn seed(config: &Config, fixtures: &Fixtures) {
    migrate::run_migrations(config).await.unwrap();
    let pool = db::open(config).await.unwrap();
    let items = config.db.table("redirection_items");
    let log = config.db.table("redirection_404");
    let content = config.db.table("content_paths");

    for item in &fixtures.items {
        sqlx::query(&format!(
            "INSERT INTO {items} (url, action_data, regex, status) VALUES (?, '/target', ?, ?)"
        ))
        .bind(item.url)
        .bind(item.regex as i64)
        .bind(item.status)
        .execute(&pool)
        .await
        .unwrap();
    }

    for path in &fixtures.content {
        sqlx::query(&format!(
            "INSERT OR IGNORE INTO {content} (path, kind) VALUES (?, 'page')"
        ))
        .bind(*path)
        .execute(&pool)
        .await
        .unwrap();
    }

    let now = chrono::Utc::now().timestamp();
    for (i, (url, agent, ip)) in fixtures.hits.iter().enumerate() {
        sqlx::query(&format!(
            "INSERT INTO {log} (created, url, agent, ip) VALUES (?, ?, ?, ?)"
        ))
        .bind(now - i as i64)
        .bind(*url)
        .bind(*agent)
        .bind(*ip)
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;
}

pub async fn count_404(config: &Config) -> i64 {
    let pool = db::open(config).await.unwrap();
    let n: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {}",
        config.db.table("redirection_404")
    ))
    .fetch_one(&pool)
    .await
    .unwrap();
    pool.close().await;
    n
}
