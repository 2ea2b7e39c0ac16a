//! Bridge configuration
//!
//! Built-in defaults, then `config/bridge.toml`, then `BRIDGE__*` variables
//! (e.g. `BRIDGE__API_URL`, `BRIDGE__LOG__LEVEL`).

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use attendance_shared::config::LogSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    /// API base including the `/api` prefix
    pub api_url: String,
    pub username: String,
    pub password: String,
    /// Reader device path. Standard input when unset.
    pub device: Option<String>,
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub error_backoff_ms: u64,
    pub settings_refresh_seconds: u64,
    pub request_timeout_seconds: u64,
    pub log: LogSettings,
}

impl BridgeConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::builder()?
            .add_source(File::with_name("config/bridge").required(false))
            .add_source(
                Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api_url", "http://localhost:3000/api")?
            .set_default("username", "")?
            .set_default("password", "")?
            .set_default("debounce_ms", 3000)?
            .set_default("poll_interval_ms", 200)?
            .set_default("error_backoff_ms", 1000)?
            .set_default("settings_refresh_seconds", 30)?
            .set_default("request_timeout_seconds", 10)?
            .set_default("log.level", "info,card_bridge=debug")?
            .set_default("log.format", "pretty")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn settings_refresh(&self) -> Duration {
        Duration::from_secs(self.settings_refresh_seconds)
    }
}
