// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::ledger::{InMemoryLedger, Ledger};
use crate::service::CampusService;
use crate::storage::AccountRegistry;

#[derive(Clone)]
pub struct AppState {
    pub campus: Arc<CampusService>,
}

impl AppState {
    pub fn new(campus: CampusService) -> Self {
        Self {
            campus: Arc::new(campus),
        }
    }

    /// State over the given ledger with an in-memory registry.
    pub fn with_ledger(ledger: Arc<dyn Ledger>, jwt_secret: &[u8], session_ttl_secs: u64) -> Self {
        Self::new(CampusService::new(
            ledger,
            AccountRegistry::in_memory(),
            SessionManager::new(jwt_secret, session_ttl_secs),
        ))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_ledger(
            Arc::new(InMemoryLedger::new()),
            crate::config::DEFAULT_JWT_SECRET.as_bytes(),
            crate::config::DEFAULT_SESSION_TTL_SECS,
        )
    }
}
