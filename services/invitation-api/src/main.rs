use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::serve;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wedding_invitation_api::{create_router, ApiState, InvitationApiConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = InvitationApiConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config)?;

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .context("invalid server bind address")?;

    info!(
        %addr,
        data_dir = %config.data_dir.display(),
        music_dir = %config.music_dir.display(),
        "starting invitation-api service"
    );

    let state = Arc::new(ApiState::new(config).context("failed to initialise storage")?);
    let router = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound address")?;
    info!(%local_addr, "invitation-api listening");

    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server encountered an unrecoverable error")?;

    info!("invitation-api shutdown complete");
    Ok(())
}

fn init_tracing(config: &InvitationApiConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| std::env::var("LOG_LEVEL").map(EnvFilter::new))
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
