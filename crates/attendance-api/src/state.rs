//! Shared application state

use std::sync::Arc;

use attendance_core::repositories::StoreHealth;
use attendance_core::services::{
    AuthService, Clock, MemberService, RecordService, SettingsService, SystemClock, TableService,
    UserService,
};
use attendance_infrastructure::Repositories;
use attendance_security::jwt::JwtService;
use attendance_shared::config::AppConfig;

use crate::middleware::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub tables: Arc<TableService>,
    pub members: Arc<MemberService>,
    pub records: Arc<RecordService>,
    pub settings: Arc<SettingsService>,
    pub health: Arc<dyn StoreHealth>,
    pub rate_limiter: Option<Arc<IpRateLimiter>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(repos: Repositories, config: AppConfig) -> Self {
        Self::with_clock(repos, config, Arc::new(SystemClock))
    }

    pub fn with_clock(repos: Repositories, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.expiry_seconds));
        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| IpRateLimiter::new(&config.rate_limit))
            .flatten()
            .map(Arc::new);

        Self {
            auth: Arc::new(AuthService::new(repos.users.clone(), jwt)),
            users: Arc::new(UserService::new(repos.users.clone())),
            tables: Arc::new(TableService::new(
                repos.tables.clone(),
                repos.members.clone(),
                repos.records.clone(),
            )),
            members: Arc::new(MemberService::new(repos.members.clone(), repos.tables.clone())),
            records: Arc::new(RecordService::new(
                repos.records.clone(),
                repos.members.clone(),
                repos.tables.clone(),
                clock,
            )),
            settings: Arc::new(SettingsService::new(repos.settings.clone(), repos.tables.clone())),
            health: repos.health,
            rate_limiter,
            config: Arc::new(config),
        }
    }
}
