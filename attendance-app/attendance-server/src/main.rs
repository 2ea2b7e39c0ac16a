use std::net::SocketAddr;

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{info, warn};

use attendance_api::{create_router, AppState};
use attendance_infrastructure::Repositories;
use attendance_shared::config::AppConfig;
use attendance_shared::constants::MEMORY_DATABASE_URL;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    attendance_shared::telemetry::init_telemetry(&config.log)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    if config.jwt.secret == "change-me" {
        if config.is_production() {
            bail!("JWT__SECRET must be set in production");
        }
        warn!("Using the default JWT secret, set JWT__SECRET before deploying");
    }

    if config.database.url == MEMORY_DATABASE_URL {
        warn!("Using the in-memory store, data is lost on restart");
    } else {
        info!("Connecting to database...");
    }
    let repos = Repositories::connect(&config.database)
        .await
        .context("failed to initialise storage")?;
    info!("Storage ready");

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));

    let app = create_router(AppState::new(repos, config));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
