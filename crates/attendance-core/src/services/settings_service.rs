//! Card reader settings per user group

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use attendance_shared::constants::{SETTING_ACTIVE_TABLE, SETTING_MODE};

use crate::domain::{Actor, RecordType, Settings};
use crate::error::DomainError;
use crate::repositories::{SettingsRepository, TableRepository};

use super::table_service::load_table;

pub struct SettingsService {
    settings_repo: Arc<dyn SettingsRepository>,
    table_repo: Arc<dyn TableRepository>,
}

impl SettingsService {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>, table_repo: Arc<dyn TableRepository>) -> Self {
        Self {
            settings_repo,
            table_repo,
        }
    }

    /// Unparseable stored values read as unset.
    pub async fn get(&self, actor: &Actor) -> Result<Settings, DomainError> {
        let mut settings = Settings::default();
        for (key, value) in self.settings_repo.get_all(&actor.user_group).await? {
            match key.as_str() {
                SETTING_ACTIVE_TABLE => settings.active_table = Uuid::parse_str(&value).ok(),
                SETTING_MODE => settings.mode = RecordType::from_str(&value),
                _ => {}
            }
        }
        Ok(settings)
    }

    pub async fn set_active_table(&self, actor: &Actor, table_id: &Uuid) -> Result<Settings, DomainError> {
        actor.require_admin()?;
        load_table(self.table_repo.as_ref(), actor, table_id).await?;
        self.settings_repo
            .set(&actor.user_group, SETTING_ACTIVE_TABLE, &table_id.to_string())
            .await?;
        info!("Active table for group {} set to {}", actor.user_group, table_id);
        self.get(actor).await
    }

    pub async fn set_mode(&self, actor: &Actor, mode: RecordType) -> Result<Settings, DomainError> {
        actor.require_admin()?;
        self.settings_repo
            .set(&actor.user_group, SETTING_MODE, mode.as_str())
            .await?;
        info!("Reader mode for group {} set to {}", actor.user_group, mode.as_str());
        self.get(actor).await
    }
}
