//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECONDS, DEFAULT_TOKEN_EXPIRY,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub rate_limit: RateLimitSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// `*` allows any origin.
    pub cors_origin: String,
    /// Directory holding the dashboard assets, served for non-API paths.
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_seconds: u64,
    /// Key on the first `X-Forwarded-For` hop instead of the socket peer.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Self::builder(&env)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Defaults only, no files or environment. Used by tests and tools.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("test")?.build()?.try_deserialize()
    }

    fn builder(
        env: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", env)?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 3000)?
            .set_default("app.name", "attendance-server")?
            .set_default("app.cors_origin", "*")?
            .set_default("database.url", "postgres://localhost/attendance")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("jwt.secret", "change-me")?
            .set_default("jwt.expiry_seconds", DEFAULT_TOKEN_EXPIRY)?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.max_requests", DEFAULT_RATE_LIMIT_MAX_REQUESTS)?
            .set_default("rate_limit.window_seconds", DEFAULT_RATE_LIMIT_WINDOW_SECONDS)?
            .set_default("rate_limit.trust_forwarded", false)?
            .set_default("log.level", "info,attendance=debug")?
            .set_default("log.format", "pretty")
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
