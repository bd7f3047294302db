// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Storage
//!
//! Registries are built on the [`Store`] trait so the backing persistence can
//! change without touching handler logic:
//!
//! - [`MemoryStore`]: process-local maps, lost on restart (default)
//! - [`RedbStore`]: one redb table per registry, selected with `DATA_DIR`
//!
//! ## Layout
//!
//! ```text
//! users        username  -> UserRecord
//! emails       email     -> username
//! merchants    id        -> Merchant
//! student_ids  studentId -> username
//! ```

pub mod memory;
pub mod redb_store;
pub mod registry;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;
pub use registry::{AccountRegistry, Merchant, RegistrationError, UserRecord};

/// Keyed storage for one registry.
pub trait Store<V>: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<V>>;

    /// Insert or replace.
    fn put(&self, key: &str, value: V) -> StoreResult<()>;

    /// Remove and return the previous value.
    fn delete(&self, key: &str) -> StoreResult<Option<V>>;

    /// All entries, in key order for persistent stores.
    fn entries(&self) -> StoreResult<Vec<(String, V)>>;
}

/// Errors from registry stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
