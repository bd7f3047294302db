// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC ledger backend talking to a deployed BearBucks contract.

use std::str::FromStr;

use alloy::{
    eips::BlockNumberOrTag,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::client::{Ledger, LedgerError, LedgerResult};
use super::contract::IBearBucks;
use super::types::{Credentials, TransferEvent, TxHash, UserAssets};
use super::wallet::signer_from_hex;

/// BearBucks contract on an EVM node, with the admin key filling signatures.
pub struct EvmLedger {
    rpc_url: url::Url,
    contract_address: Address,
    admin_address: Address,
    admin: DynProvider,
}

impl EvmLedger {
    /// Connect to `rpc_url` and bind the contract at `contract_address`.
    ///
    /// No RPC request is made here; the first call surfaces connection errors.
    pub fn connect(
        rpc_url: &str,
        contract_address: &str,
        admin_private_key: &str,
    ) -> LedgerResult<Self> {
        let rpc_url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;
        let contract_address = Address::from_str(contract_address)
            .map_err(|e| LedgerError::InvalidAddress(e.to_string()))?;

        let admin_signer = signer_from_hex(admin_private_key)?;
        let admin_address = admin_signer.address();
        let admin = ProviderBuilder::new()
            .wallet(EthereumWallet::from(admin_signer))
            .connect_http(rpc_url.clone())
            .erased();

        Ok(Self {
            rpc_url,
            contract_address,
            admin_address,
            admin,
        })
    }

    /// Address of the admin signer.
    pub fn admin_address(&self) -> Address {
        self.admin_address
    }

    /// Contract address this backend is bound to.
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    fn contract(&self) -> IBearBucks::IBearBucksInstance<DynProvider> {
        IBearBucks::new(self.contract_address, self.admin.clone())
    }
}

/// Wait for a receipt and reject reverted transactions.
async fn confirm(pending: PendingTransactionBuilder<Ethereum>) -> LedgerResult<TxHash> {
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

    if !receipt.status() {
        return Err(LedgerError::Reverted(format!(
            "transaction {} reverted",
            receipt.transaction_hash
        )));
    }
    Ok(receipt.transaction_hash)
}

fn contract_error(e: alloy::contract::Error) -> LedgerError {
    LedgerError::ContractError(e.to_string())
}

#[async_trait]
impl Ledger for EvmLedger {
    async fn fund(&self, to: Address, wei: U256) -> LedgerResult<TxHash> {
        let tx = TransactionRequest::default().to(to).value(wei);
        let pending = self
            .admin
            .send_transaction(tx)
            .await
            .map_err(|e| LedgerError::RpcError(e.to_string()))?;
        confirm(pending).await
    }

    async fn mint(&self, to: Address, amount: U256) -> LedgerResult<TxHash> {
        let pending = self
            .contract()
            .mint(to, amount)
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending).await
    }

    async fn set_user_credentials(
        &self,
        user: Address,
        email: &str,
        encrypted_password: &str,
    ) -> LedgerResult<TxHash> {
        let pending = self
            .contract()
            .setUserCredentials(user, email.to_string(), encrypted_password.to_string())
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending).await
    }

    async fn user_credentials(&self, user: Address) -> LedgerResult<Credentials> {
        let stored = self
            .contract()
            .userCredentials(user)
            .call()
            .await
            .map_err(contract_error)?;

        Ok(Credentials {
            email: stored.email,
            encrypted_password: stored.encryptedPassword,
        })
    }

    async fn set_user_assets(&self, user: Address, assets: &UserAssets) -> LedgerResult<TxHash> {
        let pending = self
            .contract()
            .setUserAssets(
                user,
                assets.student_id.clone(),
                assets.ticket_access,
                assets.door_access,
                U256::from(assets.attendance),
            )
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending).await
    }

    async fn user_assets(&self, user: Address) -> LedgerResult<UserAssets> {
        let stored = self
            .contract()
            .getUserAssets(user)
            .call()
            .await
            .map_err(contract_error)?;

        Ok(UserAssets {
            student_id: stored.studentId,
            ticket_access: stored.ticketAccess,
            door_access: stored.doorAccess,
            attendance: stored.attendance.saturating_to::<u64>(),
        })
    }

    async fn increment_attendance(&self, user: Address) -> LedgerResult<TxHash> {
        let pending = self
            .contract()
            .incrementAttendance(user)
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending).await
    }

    async fn native_balance(&self, owner: Address) -> LedgerResult<U256> {
        self.admin
            .get_balance(owner)
            .await
            .map_err(|e| LedgerError::RpcError(e.to_string()))
    }

    async fn token_balance(&self, owner: Address) -> LedgerResult<U256> {
        let balance: U256 = self
            .contract()
            .balanceOf(owner)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(balance)
    }

    async fn transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> LedgerResult<TxHash> {
        // Signed by the sender's own key, not the admin.
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(from.clone()))
            .connect_http(self.rpc_url.clone());
        let contract = IBearBucks::new(self.contract_address, provider);

        let pending = contract
            .transfer(to, amount)
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending).await
    }

    async fn transfer_events(&self) -> LedgerResult<Vec<TransferEvent>> {
        let logs = self
            .contract()
            .Transfer_filter()
            .from_block(0u64)
            .to_block(BlockNumberOrTag::Latest)
            .query()
            .await
            .map_err(contract_error)?;

        Ok(logs
            .into_iter()
            .map(|(event, log)| TransferEvent {
                from: event.from,
                to: event.to,
                value: event.value,
                tx_hash: log.transaction_hash,
                block_number: log.block_number,
            })
            .collect())
    }
}
