// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process ledger with BearBucks contract semantics.
//!
//! Keeps native balances, token balances, credentials, card assets and the
//! `Transfer` log in memory. Every write bumps a block counter and returns a
//! deterministic hash. Used for development runs and the test suite.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use alloy::{
    primitives::{keccak256, Address, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::client::{Ledger, LedgerError, LedgerResult};
use super::types::{parse_ether, Credentials, TransferEvent, TxHash, UserAssets};

/// Native ETH held by the admin account at genesis.
const ADMIN_GENESIS_ETH: &str = "10000";

/// Ledger operations that can be forced to revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    Fund,
    Mint,
    SetCredentials,
    ReadCredentials,
    SetAssets,
    ReadAssets,
    IncrementAttendance,
    ReadBalance,
    Transfer,
    ReadEvents,
}

impl LedgerOp {
    fn name(self) -> &'static str {
        match self {
            LedgerOp::Fund => "fund",
            LedgerOp::Mint => "mint",
            LedgerOp::SetCredentials => "setUserCredentials",
            LedgerOp::ReadCredentials => "userCredentials",
            LedgerOp::SetAssets => "setUserAssets",
            LedgerOp::ReadAssets => "getUserAssets",
            LedgerOp::IncrementAttendance => "incrementAttendance",
            LedgerOp::ReadBalance => "balanceOf",
            LedgerOp::Transfer => "transfer",
            LedgerOp::ReadEvents => "queryFilter",
        }
    }
}

#[derive(Default)]
struct ChainState {
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, U256>,
    total_supply: U256,
    credentials: HashMap<Address, Credentials>,
    assets: HashMap<Address, UserAssets>,
    events: Vec<TransferEvent>,
    block: u64,
    failing: HashSet<LedgerOp>,
}

impl ChainState {
    fn check(&self, op: LedgerOp) -> LedgerResult<()> {
        if self.failing.contains(&op) {
            Err(LedgerError::Reverted(format!("{} rejected", op.name())))
        } else {
            Ok(())
        }
    }

    /// Add `amount` to a balance, reverting instead of wrapping.
    fn credit(
        balances: &mut HashMap<Address, U256>,
        to: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        let balance = balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Reverted("arithmetic overflow".to_string()))?;
        Ok(())
    }

    /// Mine a block for `op` and return its transaction hash.
    fn mine(&mut self, op: LedgerOp) -> TxHash {
        self.block += 1;
        let mut preimage = op.name().as_bytes().to_vec();
        preimage.extend_from_slice(&self.block.to_be_bytes());
        keccak256(preimage)
    }
}

/// Simulated single-contract chain.
pub struct InMemoryLedger {
    admin: Address,
    state: Mutex<ChainState>,
}

impl InMemoryLedger {
    /// Create a ledger whose admin account holds the genesis ETH supply.
    pub fn new() -> Self {
        let admin = PrivateKeySigner::random().address();
        let mut state = ChainState::default();
        state
            .native
            .insert(admin, parse_ether(ADMIN_GENESIS_ETH).unwrap_or(U256::MAX));
        Self {
            admin,
            state: Mutex::new(state),
        }
    }

    /// Address of the admin account.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Make every subsequent `op` revert.
    pub fn fail(&self, op: LedgerOp) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(op);
        }
    }

    /// Let `op` succeed again.
    pub fn recover(&self, op: LedgerOp) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.remove(&op);
        }
    }

    /// Number of mined blocks; a write that reverts mines nothing.
    pub fn block_number(&self) -> u64 {
        self.state.lock().map(|s| s.block).unwrap_or_default()
    }

    fn state(&self) -> LedgerResult<MutexGuard<'_, ChainState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger state poisoned".to_string()))
    }

    fn move_tokens(
        state: &mut ChainState,
        from: Address,
        to: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        let balance = state.tokens.get(&from).copied().unwrap_or_default();
        if balance < amount {
            return Err(LedgerError::Reverted(
                "ERC20: transfer amount exceeds balance".to_string(),
            ));
        }
        state.tokens.insert(from, balance - amount);
        ChainState::credit(&mut state.tokens, to, amount)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn fund(&self, to: Address, wei: U256) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::Fund)?;

        let admin_balance = state.native.get(&self.admin).copied().unwrap_or_default();
        if admin_balance < wei {
            return Err(LedgerError::TransactionFailed(
                "insufficient funds for transfer".to_string(),
            ));
        }
        state.native.insert(self.admin, admin_balance - wei);
        ChainState::credit(&mut state.native, to, wei)?;
        Ok(state.mine(LedgerOp::Fund))
    }

    async fn mint(&self, to: Address, amount: U256) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::Mint)?;

        let supply = state.total_supply.checked_add(amount).ok_or_else(|| {
            LedgerError::Reverted("ERC20: total supply overflow".to_string())
        })?;
        ChainState::credit(&mut state.tokens, to, amount)?;
        state.total_supply = supply;
        let hash = state.mine(LedgerOp::Mint);
        let block = state.block;
        state.events.push(TransferEvent {
            from: Address::ZERO,
            to,
            value: amount,
            tx_hash: Some(hash),
            block_number: Some(block),
        });
        Ok(hash)
    }

    async fn set_user_credentials(
        &self,
        user: Address,
        email: &str,
        encrypted_password: &str,
    ) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::SetCredentials)?;

        state.credentials.insert(
            user,
            Credentials {
                email: email.to_string(),
                encrypted_password: encrypted_password.to_string(),
            },
        );
        Ok(state.mine(LedgerOp::SetCredentials))
    }

    async fn user_credentials(&self, user: Address) -> LedgerResult<Credentials> {
        let state = self.state()?;
        state.check(LedgerOp::ReadCredentials)?;
        Ok(state.credentials.get(&user).cloned().unwrap_or_default())
    }

    async fn set_user_assets(&self, user: Address, assets: &UserAssets) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::SetAssets)?;

        state.assets.insert(user, assets.clone());
        Ok(state.mine(LedgerOp::SetAssets))
    }

    async fn user_assets(&self, user: Address) -> LedgerResult<UserAssets> {
        let state = self.state()?;
        state.check(LedgerOp::ReadAssets)?;
        Ok(state.assets.get(&user).cloned().unwrap_or_default())
    }

    async fn increment_attendance(&self, user: Address) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::IncrementAttendance)?;

        let assets = state.assets.entry(user).or_default();
        assets.attendance = assets.attendance.saturating_add(1);
        Ok(state.mine(LedgerOp::IncrementAttendance))
    }

    async fn native_balance(&self, owner: Address) -> LedgerResult<U256> {
        let state = self.state()?;
        state.check(LedgerOp::ReadBalance)?;
        Ok(state.native.get(&owner).copied().unwrap_or_default())
    }

    async fn token_balance(&self, owner: Address) -> LedgerResult<U256> {
        let state = self.state()?;
        state.check(LedgerOp::ReadBalance)?;
        Ok(state.tokens.get(&owner).copied().unwrap_or_default())
    }

    async fn transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> LedgerResult<TxHash> {
        let mut state = self.state()?;
        state.check(LedgerOp::Transfer)?;

        let sender = from.address();
        Self::move_tokens(&mut state, sender, to, amount)?;
        let hash = state.mine(LedgerOp::Transfer);
        let block = state.block;
        state.events.push(TransferEvent {
            from: sender,
            to,
            value: amount,
            tx_hash: Some(hash),
            block_number: Some(block),
        });
        Ok(hash)
    }

    async fn transfer_events(&self) -> LedgerResult<Vec<TransferEvent>> {
        let state = self.state()?;
        state.check(LedgerOp::ReadEvents)?;
        Ok(state.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(amount: &str) -> U256 {
        parse_ether(amount).unwrap()
    }

    #[tokio::test]
    async fn mint_records_transfer_from_zero_address() {
        let ledger = InMemoryLedger::new();
        let user = PrivateKeySigner::random().address();

        ledger.mint(user, eth("5")).await.unwrap();

        assert_eq!(ledger.token_balance(user).await.unwrap(), eth("5"));
        let events = ledger.transfer_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from, Address::ZERO);
        assert_eq!(events[0].to, user);
        assert_eq!(events[0].block_number, Some(1));
    }

    #[tokio::test]
    async fn transfer_moves_tokens_and_logs_event() {
        let ledger = InMemoryLedger::new();
        let sender = PrivateKeySigner::random();
        let merchant = PrivateKeySigner::random().address();
        ledger.mint(sender.address(), eth("5")).await.unwrap();

        let hash = ledger.transfer(&sender, merchant, eth("1.5")).await.unwrap();

        assert_eq!(ledger.token_balance(sender.address()).await.unwrap(), eth("3.5"));
        assert_eq!(ledger.token_balance(merchant).await.unwrap(), eth("1.5"));
        let last = ledger.transfer_events().await.unwrap().pop().unwrap();
        assert_eq!(last.from, sender.address());
        assert_eq!(last.tx_hash, Some(hash));
    }

    #[tokio::test]
    async fn overdraft_reverts_without_mining() {
        let ledger = InMemoryLedger::new();
        let sender = PrivateKeySigner::random();
        let merchant = PrivateKeySigner::random().address();
        ledger.mint(sender.address(), eth("1")).await.unwrap();
        let before = ledger.block_number();

        let err = ledger.transfer(&sender, merchant, eth("2")).await.unwrap_err();

        assert!(matches!(err, LedgerError::Reverted(_)));
        assert_eq!(ledger.block_number(), before);
        assert_eq!(ledger.token_balance(sender.address()).await.unwrap(), eth("1"));
    }

    #[tokio::test]
    async fn mint_past_total_supply_reverts() {
        let ledger = InMemoryLedger::new();
        let user = PrivateKeySigner::random().address();
        ledger.mint(user, eth("5")).await.unwrap();
        let before = ledger.block_number();

        let err = ledger.mint(user, U256::MAX).await.unwrap_err();

        assert!(matches!(err, LedgerError::Reverted(_)));
        assert_eq!(ledger.token_balance(user).await.unwrap(), eth("5"));
        assert_eq!(ledger.block_number(), before);
        assert_eq!(ledger.transfer_events().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fund_draws_from_admin() {
        let ledger = InMemoryLedger::new();
        let user = PrivateKeySigner::random().address();

        ledger.fund(user, eth("10")).await.unwrap();

        assert_eq!(ledger.native_balance(user).await.unwrap(), eth("10"));
        assert_eq!(
            ledger.native_balance(ledger.admin()).await.unwrap(),
            eth("9990")
        );
    }

    #[tokio::test]
    async fn assets_and_attendance_round_trip() {
        let ledger = InMemoryLedger::new();
        let user = PrivateKeySigner::random().address();
        assert_eq!(ledger.user_assets(user).await.unwrap(), UserAssets::default());

        let assets = UserAssets {
            student_id: "S1".into(),
            ticket_access: true,
            door_access: false,
            attendance: 2,
        };
        ledger.set_user_assets(user, &assets).await.unwrap();
        ledger.increment_attendance(user).await.unwrap();

        let stored = ledger.user_assets(user).await.unwrap();
        assert_eq!(stored.student_id, "S1");
        assert_eq!(stored.attendance, 3);
    }

    #[tokio::test]
    async fn injected_failure_reverts_until_recovered() {
        let ledger = InMemoryLedger::new();
        let user = PrivateKeySigner::random().address();

        ledger.fail(LedgerOp::SetCredentials);
        assert!(ledger
            .set_user_credentials(user, "a@x.com", "pw")
            .await
            .is_err());

        ledger.recover(LedgerOp::SetCredentials);
        ledger
            .set_user_credentials(user, "a@x.com", "pw")
            .await
            .unwrap();
        let creds = ledger.user_credentials(user).await.unwrap();
        assert_eq!(creds.email, "a@x.com");
        assert_eq!(creds.encrypted_password, "pw");
    }
}
