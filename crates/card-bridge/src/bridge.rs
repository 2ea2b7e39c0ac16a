//! Reader loop

use std::future::Future;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::{ApiClient, CheckinOutcome, ReaderSettings};
use crate::config::BridgeConfig;
use crate::debounce::Debouncer;
use crate::error::BridgeError;
use crate::reader::CardSource;

#[derive(Debug)]
pub enum CardOutcome {
    Debounced,
    NoActiveTable,
    UnknownCard,
    Recorded(CheckinOutcome),
}

pub struct Bridge<S> {
    client: ApiClient,
    source: S,
    debouncer: Debouncer,
    config: BridgeConfig,
    settings: ReaderSettings,
    refreshed_at: Option<Instant>,
}

impl<S: CardSource> Bridge<S> {
    pub fn new(client: ApiClient, source: S, config: BridgeConfig) -> Self {
        Self {
            client,
            source,
            debouncer: Debouncer::new(config.debounce()),
            config,
            settings: ReaderSettings::default(),
            refreshed_at: None,
        }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub async fn login(&self) -> Result<(), BridgeError> {
        self.client
            .login(&self.config.username, &self.config.password)
            .await
    }

    /// Poll until the source closes or `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<(), BridgeError> {
        tokio::pin!(shutdown);
        if let Err(e) = self.refresh_settings().await {
            warn!("Could not load reader settings: {}", e);
        }

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.source.poll() => polled,
            };

            let delay = match polled {
                Ok(Some(card_id)) => {
                    self.report(&card_id).await;
                    continue;
                }
                Ok(None) => self.config.poll_interval(),
                Err(BridgeError::ReaderClosed) => {
                    info!("Card reader closed");
                    return Ok(());
                }
                Err(e) => {
                    warn!("Reader error: {}", e);
                    self.config.error_backoff()
                }
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Bridge stopping");
        Ok(())
    }

    async fn report(&mut self, card_id: &str) {
        match self.handle_card(card_id, Instant::now()).await {
            Ok(CardOutcome::Recorded(outcome)) => info!(
                "{} - {} ({})",
                outcome.message.as_deref().unwrap_or("Recorded"),
                outcome.member_name,
                outcome.member_employee_id
            ),
            Ok(CardOutcome::Debounced) => debug!("Ignoring repeated read of {}", card_id),
            Ok(CardOutcome::NoActiveTable) => {
                warn!("Card {} read but no active table is set", card_id)
            }
            Ok(CardOutcome::UnknownCard) => warn!("Card {} is not bound to any member", card_id),
            Err(e) => warn!("Card {} failed: {}", card_id, e),
        }
    }

    /// Debounce, look up the member and record the read.
    pub async fn handle_card(
        &mut self,
        card_id: &str,
        now: Instant,
    ) -> Result<CardOutcome, BridgeError> {
        if !self.debouncer.accept(card_id, now) {
            return Ok(CardOutcome::Debounced);
        }
        info!("Card read: {}", card_id);

        if self.settings_stale(now) {
            if let Err(e) = self.refresh_settings().await {
                warn!("Keeping previous settings: {}", e);
            }
        }

        match self.record(card_id).await {
            Err(BridgeError::Unauthorized) => {
                info!("Token rejected, logging in again");
                self.login().await?;
                self.record(card_id).await
            }
            other => other,
        }
    }

    async fn record(&self, card_id: &str) -> Result<CardOutcome, BridgeError> {
        let Some(table_id) = self.settings.active_table else {
            return Ok(CardOutcome::NoActiveTable);
        };
        if self.client.member_by_card(card_id).await?.is_none() {
            return Ok(CardOutcome::UnknownCard);
        }

        let mode = self.settings.mode.unwrap_or_default();
        let outcome = self.client.card_checkin(card_id, table_id, mode).await?;
        Ok(CardOutcome::Recorded(outcome))
    }

    fn settings_stale(&self, now: Instant) -> bool {
        self.refreshed_at.map_or(true, |at| {
            now.saturating_duration_since(at) >= self.config.settings_refresh()
        })
    }

    /// Reload the active table and mode, logging in again once on 401.
    pub async fn refresh_settings(&mut self) -> Result<(), BridgeError> {
        let settings = match self.client.settings().await {
            Err(BridgeError::Unauthorized) => {
                self.login().await?;
                self.client.settings().await?
            }
            other => other?,
        };

        if settings != self.settings {
            info!(
                "Active table {:?}, mode {:?}",
                settings.active_table,
                settings.mode.unwrap_or_default()
            );
        }
        self.settings = settings;
        self.refreshed_at = Some(Instant::now());
        Ok(())
    }
}
