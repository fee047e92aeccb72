//! File logging for the console binary.
//!
//! The terminal belongs to the TUI, so records go to a file. A
//! `config/log4rs.yaml` under the working directory takes precedence over
//! the settings-driven appender.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::ConsoleSettings;

pub const LOG4RS_PATH: &str = "config/log4rs.yaml";
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

pub fn init(root: &Path, settings: &ConsoleSettings) -> Result<()> {
    let yaml = root.join(LOG4RS_PATH);
    if yaml.exists() {
        log4rs::init_file(&yaml, Default::default())
            .with_context(|| format!("Failed to load logging config: {}", yaml.display()))?;
        info!("Logging configured from {}", yaml.display());
        return Ok(());
    }

    let config = file_config(&root.join(&settings.log_file), settings)?;
    log4rs::init_config(config).context("Failed to install logger")?;
    info!("Logging to {}", settings.log_file.display());
    Ok(())
}

/// Builds a single-file configuration at the settings' level.
pub fn file_config(path: &Path, settings: &ConsoleSettings) -> Result<Config> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(settings.level_filter()))
        .context("Invalid logging configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_creates_the_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/console.log");
        let settings = ConsoleSettings {
            log_level: String::from("debug"),
            ..ConsoleSettings::default()
        };

        let config = file_config(&path, &settings).unwrap();
        assert_eq!(config.root().level(), log::LevelFilter::Debug);
        assert!(path.parent().is_some_and(Path::exists));
    }
}
