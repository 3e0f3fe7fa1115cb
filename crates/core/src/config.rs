use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EvloopError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub handlers: HandlerConfig,
    pub driver: DriverConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Every key is optional; unset keys keep their defaults.
    pub fn from_env() -> Result<Self, EvloopError> {
        let mut config = Self::default();
        config.apply_overrides(env_opt);
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string. Environment variables still win over
    /// values from the file.
    pub fn from_toml(toml_str: &str) -> Result<Self, EvloopError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_overrides(env_opt);
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EvloopError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Load from `path` when given, otherwise from the environment alone.
    pub fn load(path: Option<&Path>) -> Result<Self, EvloopError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::from_env(),
        }
    }

    /// Overlay `EVLOOP_*` values produced by `lookup` onto this config.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let h = &mut self.handlers;
        if let Some(v) = lookup("EVLOOP_FILE_PATH") {
            h.file_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("EVLOOP_PLACEHOLDER") {
            h.placeholder = v;
        }
        if let Some(v) = lookup("EVLOOP_FETCH_BASE_URL") {
            h.fetch_base_url = v;
        }
        if let Some(v) = lookup("EVLOOP_FETCH_RECORD_ID") {
            h.fetch_record_id = v;
        }
        if let Some(v) = lookup("EVLOOP_GREETING") {
            h.greeting = v;
        }
        if let Some(ms) = lookup("EVLOOP_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.driver.poll_interval_ms = ms;
        }
    }

    pub fn validate(&self) -> Result<(), EvloopError> {
        if self.handlers.file_path.as_os_str().is_empty() {
            return Err(EvloopError::Config("handlers.file_path must not be empty".into()));
        }
        if self.handlers.fetch_base_url.trim().is_empty() {
            return Err(EvloopError::Config("handlers.fetch_base_url must not be empty".into()));
        }
        if self.driver.poll_interval_ms == 0 {
            return Err(EvloopError::Config("driver.poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  file:     path={}, placeholder={:?}", self.handlers.file_path.display(), self.handlers.placeholder);
        tracing::info!("  fetch:    base_url={}, record_id={}", self.handlers.fetch_base_url, self.handlers.fetch_record_id);
        tracing::info!("  greeting: {:?}", self.handlers.greeting);
        tracing::info!("  driver:   poll_interval_ms={}", self.driver.poll_interval_ms);
    }
}

// ── Handlers ──────────────────────────────────────────────────

/// Inputs for the built-in collaborator handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// File read (and created if missing) by the file-content handler.
    pub file_path: PathBuf,
    /// Content written to a file that did not exist yet.
    pub placeholder: String,
    pub fetch_base_url: String,
    pub fetch_record_id: String,
    /// Payload handed to the greeting handler.
    pub greeting: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("hello.txt"),
            placeholder: "New file created".to_string(),
            fetch_base_url: "https://jsonplaceholder.typicode.com".to_string(),
            fetch_record_id: "2".to_string(),
            greeting: "How are you doing today?".to_string(),
        }
    }
}

// ── Driver ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Sleep between idle ticks when driving the loop headlessly.
    pub poll_interval_ms: u64,
}

impl DriverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 25 }
    }
}
