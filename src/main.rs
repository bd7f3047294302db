// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use bearbucks_server::{
    api::router,
    auth::SessionManager,
    config::{LedgerBackend, ServerConfig},
    ledger::{EvmLedger, InMemoryLedger, Ledger},
    service::CampusService,
    shutdown::signal_token,
    state::AppState,
    storage::{redb_store::open_database, AccountRegistry},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let ledger: Arc<dyn Ledger> = match config.ledger_backend {
        LedgerBackend::Memory => {
            tracing::info!("using in-memory ledger");
            Arc::new(InMemoryLedger::new())
        }
        LedgerBackend::Evm => {
            tracing::info!(
                rpc_url = %config.rpc_url,
                contract = %config.contract_address,
                "connecting to BearBucks contract"
            );
            Arc::new(EvmLedger::connect(
                &config.rpc_url,
                &config.contract_address,
                &config.admin_private_key,
            )?)
        }
    };

    let registry = match config.registry_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "opening persistent registry");
            AccountRegistry::persistent(open_database(&path)?)?
        }
        None => AccountRegistry::in_memory(),
    };

    let sessions = SessionManager::new(config.jwt_secret.as_bytes(), config.session_ttl_secs);
    let campus = CampusService::new(ledger, registry, sessions);

    let merchant = campus.bootstrap_merchant().await?;
    tracing::info!(
        merchant_id = merchant.id,
        address = %merchant.address,
        "merchant ready"
    );

    let app = router(AppState::new(campus));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "BearBucks API listening (docs at /docs)");

    let shutdown = signal_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
