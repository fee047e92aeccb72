use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::console::ConsoleOptions;
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "AGENT_CONSOLE_BASE_URL";
/// Settings file, relative to the working directory.
pub const SETTINGS_PATH: &str = "config/console.toml";

/// Console settings, usually loaded from `config/console.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub tick_rate_ms: u64,
    /// Delay between a successful finish and the wizard closing itself.
    pub finish_close_delay_ms: u64,
    pub upload_error_ttl_ms: u64,
    pub upload_notice_ttl_ms: u64,
    pub max_upload_bytes: u64,
    /// `log` level name (`error` through `trace`).
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000"),
            tick_rate_ms: 250,
            finish_close_delay_ms: 2_000,
            upload_error_ttl_ms: 10_000,
            upload_notice_ttl_ms: 5_000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: String::from("info"),
            log_file: PathBuf::from("logs/agent-console.log"),
        }
    }
}

impl ConsoleSettings {
    /// Reads `config/console.toml` under `root`, falling back to defaults when
    /// the file is absent, then applies the environment override.
    pub fn load(root: &Path) -> Result<Self> {
        let settings = Self::load_file(&root.join(SETTINGS_PATH))?;
        Ok(settings.with_base_url_override(env::var(BASE_URL_ENV).ok()))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: ConsoleSettings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings)
    }

    /// Replaces `base_url` with `value` unless it is missing or blank.
    pub fn with_base_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|url| !url.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            finish_close_delay: Duration::from_millis(self.finish_close_delay_ms),
            upload_error_ttl: Duration::from_millis(self.upload_error_ttl_ms),
            upload_notice_ttl: Duration::from_millis(self.upload_notice_ttl_ms),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
