mod app;
mod config;
mod error;
mod extract;
mod handlers;
mod models;
mod origin;
mod record;
mod server;
mod state;

use gsm_common::{init_tracing, shutdown_signal};
use std::process::ExitCode;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let _guards = init_tracing("ingest-service");

    let config = ServerConfig::from_env();
    tracing::debug!(?config, "loaded configuration");

    let handle = match server::start(config).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(error = %err, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("GSM API listening on http://{}", handle.local_addr());

    shutdown_signal().await;
    tracing::info!("shutdown requested");

    if let Err(err) = handle.stop().await {
        tracing::error!(error = %err, "server exited with error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
