// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin dashboard proxy in front of the BearBucks API.

use std::process::ExitCode;

use bearbucks_server::{
    config::ProxyConfig,
    proxy::{router, ProxyState},
    shutdown::signal_token,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "admin proxy failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProxyConfig::from_env()?;
    let app = router(ProxyState::new(config.upstream.clone())?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        upstream = %config.upstream,
        "admin proxy listening"
    );

    let shutdown = signal_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
