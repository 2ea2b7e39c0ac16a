//! Application-wide constants

pub const DEFAULT_USER_GROUP: &str = "default";
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Seven days, the lifetime of an issued access token.
pub const DEFAULT_TOKEN_EXPIRY: i64 = 604_800;

pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 900;

pub const SETTING_ACTIVE_TABLE: &str = "activeTable";
pub const SETTING_MODE: &str = "mode";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Database URL that selects the in-memory store instead of PostgreSQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";
