// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger interface every backend implements.

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::types::{Credentials, TransferEvent, TxHash, UserAssets};

/// Result type for ledger calls.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Operations exposed by the BearBucks contract and its hosting chain.
///
/// Write methods wait for confirmation and return the transaction hash.
/// Admin-signed calls use the backend's admin key; only [`Ledger::transfer`]
/// is signed by the caller-supplied wallet.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Send native ETH from the admin account.
    async fn fund(&self, to: Address, wei: U256) -> LedgerResult<TxHash>;

    /// Mint BRB to an address.
    async fn mint(&self, to: Address, amount: U256) -> LedgerResult<TxHash>;

    async fn set_user_credentials(
        &self,
        user: Address,
        email: &str,
        encrypted_password: &str,
    ) -> LedgerResult<TxHash>;

    async fn user_credentials(&self, user: Address) -> LedgerResult<Credentials>;

    /// Overwrite all four card fields in one call.
    async fn set_user_assets(&self, user: Address, assets: &UserAssets) -> LedgerResult<TxHash>;

    async fn user_assets(&self, user: Address) -> LedgerResult<UserAssets>;

    async fn increment_attendance(&self, user: Address) -> LedgerResult<TxHash>;

    /// Native ETH balance in wei.
    async fn native_balance(&self, owner: Address) -> LedgerResult<U256>;

    /// BRB balance in the token's smallest unit.
    async fn token_balance(&self, owner: Address) -> LedgerResult<U256>;

    /// Transfer BRB from the signer's wallet.
    async fn transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> LedgerResult<TxHash>;

    /// Every `Transfer` event from genesis to the latest block.
    async fn transfer_events(&self) -> LedgerResult<Vec<TransferEvent>>;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}
