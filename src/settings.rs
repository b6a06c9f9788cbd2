use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "article_crawler";
const ENV_PREFIX: &str = "CRAWLER";

/// Runtime settings: defaults < config file < `CRAWLER_*` env < CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the SQLite store, the JSON document and `textures/`.
    pub workdir: PathBuf,
    pub timeout_secs: u64,
    pub retries: u32,
    /// Seconds; the n-th retry waits `backoff_factor * 2^n`.
    pub backoff_factor: f64,
    pub user_agent: String,
    pub concurrency: usize,
    pub url_deadline_secs: u64,
    pub default_language: String,
}

impl Settings {
    /// Load settings. An explicit `file` must exist; otherwise
    /// `article_crawler.toml` in the current directory is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("workdir", ".")?
            .set_default("timeout_secs", 10_i64)?
            .set_default("retries", 3_i64)?
            .set_default("backoff_factor", 0.3_f64)?
            .set_default("user_agent", "Mozilla 5.0")?
            .set_default("concurrency", 4_i64)?
            .set_default("url_deadline_secs", 60_i64)?
            .set_default("default_language", "English")?;

        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn url_deadline(&self) -> Duration {
        Duration::from_secs(self.url_deadline_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs_f64(self.backoff_factor.max(0.0))
    }

    pub fn db_path(&self) -> PathBuf {
        self.workdir.join("db.sqlite3")
    }

    pub fn document_path(&self) -> PathBuf {
        self.workdir.join("article.json")
    }

    pub fn textures_dir(&self) -> PathBuf {
        self.workdir.join("textures")
    }

    pub fn unknown_content_types_path(&self) -> PathBuf {
        self.textures_dir().join("unknown-content-types.json")
    }

    pub fn language_codes_path(&self) -> PathBuf {
        self.textures_dir().join("language_codes.json")
    }
}

#[cfg(test)]
pub(crate) fn test_settings(workdir: &Path) -> Settings {
    Settings {
        workdir: workdir.to_path_buf(),
        timeout_secs: 5,
        retries: 2,
        backoff_factor: 0.0,
        user_agent: "article_crawler-test".into(),
        concurrency: 2,
        url_deadline_secs: 30,
        default_language: "English".into(),
    }
}
