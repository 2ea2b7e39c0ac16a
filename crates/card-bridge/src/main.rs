use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};

use card_bridge::{ApiClient, Bridge, BridgeConfig, LineCardSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = BridgeConfig::load().context("failed to load bridge configuration")?;
    attendance_shared::telemetry::init_telemetry(&config.log)?;

    if config.username.is_empty() {
        bail!("BRIDGE__USERNAME and BRIDGE__PASSWORD must be set");
    }

    info!("Card bridge starting, API at {}", config.api_url);
    let client = ApiClient::new(
        &config.api_url,
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    let source = LineCardSource::open(config.device.as_deref()).await?;

    let mut bridge = Bridge::new(client, source, config);
    bridge.login().await.context("login failed")?;
    info!("Logged in, waiting for cards");

    bridge
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
