// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BearBucks - Campus Card Ledger Service
//!
//! HTTP API over the BearBucks token contract: student wallets, BRB
//! balances, card payments to merchants, and card-based access checks.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - Session tokens (HS256 JWT) and bearer extraction
//! - `ledger` - Contract client, EVM and in-memory backends
//! - `service` - Account, asset, payment and access operations
//! - `storage` - Account registry over in-memory or redb stores
//! - `proxy` - Admin dashboard proxy to the API server

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod proxy;
pub mod service;
pub mod shutdown;
pub mod state;
pub mod storage;
pub mod telemetry;
