// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BearBucks ledger integration.
//!
//! This module provides:
//! - The [`Ledger`] trait covering every contract call the server makes
//! - [`EvmLedger`], a JSON-RPC backend for a deployed contract
//! - [`InMemoryLedger`], an in-process backend with the same semantics
//! - Wallet generation and 18-decimal unit conversion

pub mod client;
pub mod contract;
pub mod evm;
pub mod memory;
pub mod types;
pub mod wallet;

pub use client::{Ledger, LedgerError, LedgerResult};
pub use evm::EvmLedger;
pub use memory::{InMemoryLedger, LedgerOp};
pub use types::*;
pub use wallet::{generate_wallet, signer_from_hex, GeneratedWallet};
