// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registry: users, emails, merchants and the student card index.
//!
//! ## Invariants
//!
//! - username and email are unique; both are reserved together under one
//!   lock so concurrent signups cannot both pass the check
//! - studentId → user is last-writer-wins; reassigning a card id silently
//!   shadows the previous owner in this index (the ledger is keyed by
//!   address and keeps both users' fields)
//! - private keys never leave this module through API responses

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use redb::Database;
use serde::{Deserialize, Serialize};

use super::{MemoryStore, RedbStore, Store, StoreError, StoreResult};
use crate::ledger::LedgerError;
use crate::models::WalletAddress;

/// A registered application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub address: WalletAddress,
    /// `0x`-prefixed hex key; never returned via the API
    pub private_key: String,
    pub created_at: DateTime<Utc>,
}

/// A merchant that can receive card payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: u32,
    pub name: String,
    pub address: WalletAddress,
    pub private_key: String,
}

impl UserRecord {
    /// Parsed ledger address.
    pub fn ledger_address(&self) -> Result<Address, LedgerError> {
        parse_address(&self.address)
    }
}

impl Merchant {
    /// Parsed ledger address.
    pub fn ledger_address(&self) -> Result<Address, LedgerError> {
        parse_address(&self.address)
    }
}

fn parse_address(address: &WalletAddress) -> Result<Address, LedgerError> {
    Address::from_str(&address.0).map_err(|e| LedgerError::InvalidAddress(e.to_string()))
}

/// Why a signup could not be registered.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("User already exists")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Username, email, merchant and studentId lookups over injected stores.
pub struct AccountRegistry {
    users: Arc<dyn Store<UserRecord>>,
    emails: Arc<dyn Store<String>>,
    merchants: Arc<dyn Store<Merchant>>,
    student_ids: Arc<dyn Store<String>>,
    signup: Mutex<()>,
}

impl AccountRegistry {
    pub fn new(
        users: Arc<dyn Store<UserRecord>>,
        emails: Arc<dyn Store<String>>,
        merchants: Arc<dyn Store<Merchant>>,
        student_ids: Arc<dyn Store<String>>,
    ) -> Self {
        Self {
            users,
            emails,
            merchants,
            student_ids,
            signup: Mutex::new(()),
        }
    }

    /// Registry that lives only in process memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Registry persisted in redb tables of `db`.
    pub fn persistent(db: Arc<Database>) -> StoreResult<Self> {
        Ok(Self::new(
            Arc::new(RedbStore::new(db.clone(), "users")?),
            Arc::new(RedbStore::new(db.clone(), "emails")?),
            Arc::new(RedbStore::new(db.clone(), "merchants")?),
            Arc::new(RedbStore::new(db, "student_ids")?),
        ))
    }

    /// Reserve username and email for a new user.
    ///
    /// The username is checked before the email.
    pub fn register(&self, user: UserRecord) -> Result<(), RegistrationError> {
        let _guard = self.signup.lock().map_err(|_| StoreError::Poisoned)?;

        if self.users.get(&user.username)?.is_some() {
            return Err(RegistrationError::UsernameTaken);
        }
        if self.emails.get(&user.email)?.is_some() {
            return Err(RegistrationError::EmailTaken);
        }

        self.users.put(&user.username, user.clone())?;
        self.emails.put(&user.email, user.username)?;
        Ok(())
    }

    pub fn user(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        self.users.get(username)
    }

    pub fn username_for_email(&self, email: &str) -> StoreResult<Option<String>> {
        self.emails.get(email)
    }

    pub fn users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.users.entries()?.into_iter().map(|(_, u)| u).collect())
    }

    pub fn add_merchant(&self, merchant: Merchant) -> StoreResult<()> {
        self.merchants.put(&merchant.id.to_string(), merchant)
    }

    pub fn merchant(&self, id: u32) -> StoreResult<Option<Merchant>> {
        self.merchants.get(&id.to_string())
    }

    pub fn merchants(&self) -> StoreResult<Vec<Merchant>> {
        Ok(self.merchants.entries()?.into_iter().map(|(_, m)| m).collect())
    }

    /// Point `student_id` at `username`, returning the previous owner.
    pub fn assign_student_id(
        &self,
        student_id: &str,
        username: &str,
    ) -> StoreResult<Option<String>> {
        let previous = self.student_ids.get(student_id)?;
        self.student_ids.put(student_id, username.to_string())?;
        Ok(previous)
    }

    /// Resolve a card swipe to its current owner.
    pub fn user_by_student_id(&self, student_id: &str) -> StoreResult<Option<UserRecord>> {
        match self.student_ids.get(student_id)? {
            Some(username) => self.users.get(&username),
            None => Ok(None),
        }
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, email: &str) -> UserRecord {
        UserRecord {
            username: username.into(),
            email: email.into(),
            address: WalletAddress::from("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            private_key: "0x00".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let registry = AccountRegistry::in_memory();
        registry.register(record("alice", "a@x.com")).unwrap();

        let err = registry.register(record("alice", "other@x.com")).unwrap_err();
        assert!(matches!(err, RegistrationError::UsernameTaken));
        // The losing signup must not claim the email either.
        assert!(registry.username_for_email("other@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let registry = AccountRegistry::in_memory();
        registry.register(record("alice", "a@x.com")).unwrap();

        let err = registry.register(record("bob", "a@x.com")).unwrap_err();
        assert!(matches!(err, RegistrationError::EmailTaken));
        assert!(registry.user("bob").unwrap().is_none());
    }

    #[test]
    fn student_id_is_last_writer_wins() {
        let registry = AccountRegistry::in_memory();
        registry.register(record("alice", "a@x.com")).unwrap();
        registry.register(record("bob", "b@x.com")).unwrap();

        assert_eq!(registry.assign_student_id("S1", "alice").unwrap(), None);
        assert_eq!(
            registry.assign_student_id("S1", "bob").unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(
            registry.user_by_student_id("S1").unwrap().unwrap().username,
            "bob"
        );
        assert!(registry.user_by_student_id("S2").unwrap().is_none());
    }

    #[test]
    fn merchants_by_id() {
        let registry = AccountRegistry::in_memory();
        registry
            .add_merchant(Merchant {
                id: 0,
                name: "submart".into(),
                address: WalletAddress::from("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                private_key: "0x00".into(),
            })
            .unwrap();

        assert_eq!(registry.merchant(0).unwrap().unwrap().name, "submart");
        assert!(registry.merchant(1).unwrap().is_none());
        assert_eq!(registry.merchants().unwrap().len(), 1);
    }

    #[test]
    fn persistent_registry_keeps_users() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.redb");
        {
            let db = super::super::redb_store::open_database(&path).unwrap();
            let registry = AccountRegistry::persistent(db).unwrap();
            registry.register(record("alice", "a@x.com")).unwrap();
            registry.assign_student_id("S1", "alice").unwrap();
        }

        let db = super::super::redb_store::open_database(&path).unwrap();
        let registry = AccountRegistry::persistent(db).unwrap();
        assert_eq!(
            registry.username_for_email("a@x.com").unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(
            registry.user_by_student_id("S1").unwrap().unwrap().email,
            "a@x.com"
        );
    }
}
