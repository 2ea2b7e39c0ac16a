//! Request middleware and actor extractors

pub mod auth;
pub mod rate_limit;

pub use auth::{require_auth, require_super_admin, AdminUser, CurrentUser};
pub use rate_limit::{rate_limit, IpRateLimiter};
