use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::workers::DEFAULT_WORKER_DELAY;

pub const DEFAULT_CONFIG_FILE: &str = "mealplan.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub worker_delay_ms: u64,
    pub seed_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            worker_delay_ms: DEFAULT_WORKER_DELAY.as_millis() as u64,
            seed_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn worker_delay(&self) -> Duration {
        Duration::from_millis(self.worker_delay_ms)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// File values first, then environment overrides. A missing or unreadable file
/// keeps the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(file_cfg) = read_config_file(path) {
        apply_file_values(&mut settings, &file_cfg);
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn read_config_file(path: &Path) -> anyhow::Result<HashMap<String, toml::Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str::<HashMap<String, toml::Value>>(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))
}

fn apply_file_values(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("worker_delay_ms") {
        let parsed = match v {
            toml::Value::Integer(ms) => u64::try_from(*ms).ok(),
            toml::Value::String(raw) => raw.trim().parse::<u64>().ok(),
            _ => None,
        };
        if let Some(ms) = parsed {
            settings.worker_delay_ms = ms;
        }
    }
    if let Some(toml::Value::String(v)) = file_cfg.get("seed_path") {
        settings.seed_path = Some(PathBuf::from(v));
    }
    if let Some(toml::Value::String(v)) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("APP__WORKER_DELAY_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.worker_delay_ms = parsed;
        }
    }

    if let Some(v) = env("APP__SEED_PATH") {
        if !v.trim().is_empty() {
            settings.seed_path = Some(PathBuf::from(v));
        }
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
