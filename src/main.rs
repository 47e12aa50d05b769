// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use assist_scraper::api::{self, AppState};
use assist_scraper::metrics::Metrics;
use assist_scraper::{init_tracing, AppConfig, ArticulationClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = AppConfig::from_env()?;
    init_tracing(cfg.log_format);

    let client = ArticulationClient::try_new(cfg.client.clone())?;
    tracing::info!(base_url = %client.catalog().base_url(), "articulation client ready");

    let state = AppState::new(Arc::new(client), Metrics::new()?);
    let app = api::router(state);

    let listen_addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    tracing::info!(%listen_addr, "starting assist scraper");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("assist scraper exited cleanly");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term_signal) => term_signal.recv().await,
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
