//! Pitchside coordinator binary.
//!
//! Reads its configuration from the environment, binds the WebSocket
//! listener and serves until interrupted. Startup problems (bad config,
//! port already in use) end the process with a non-zero status, and so
//! does a panic anywhere in the process.

mod config;

use pitchside::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    exit_on_panic();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind,
        require_join = config.router.require_join,
        duplicate_join = ?config.router.duplicate_join,
        "starting pitchside"
    );

    let server = PitchsideServer::builder()
        .bind(&config.bind.to_string())
        .router_config(config.router)
        .build()
        .await?;
    let router = server.router();

    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("interrupted, shutting down");
            router.shutdown().await?;
        }
    }

    Ok(())
}

/// A panic in any task takes the whole process down with status 1.
fn exit_on_panic() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panic, exiting");
        default_hook(info);
        std::process::exit(1);
    }));
}
