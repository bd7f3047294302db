// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistent store backed by redb (pure Rust, ACID).
//!
//! Each registry owns one table of `&str -> JSON bytes` inside a shared
//! database file. Every `put`/`delete` is its own committed write
//! transaction.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

use super::{Store, StoreResult};

/// Open (or create) the registry database at `path`.
pub fn open_database(path: &Path) -> StoreResult<Arc<Database>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(Database::create(path)?))
}

/// One redb table holding JSON-encoded values.
pub struct RedbStore<V> {
    db: Arc<Database>,
    table: String,
    _value: PhantomData<fn() -> V>,
}

impl<V> RedbStore<V> {
    /// Bind to `table`, creating it so later read transactions don't fail.
    pub fn new(db: Arc<Database>, table: &str) -> StoreResult<Self> {
        let store = Self {
            db,
            table: table.to_string(),
            _value: PhantomData,
        };

        let write_txn = store.db.begin_write()?;
        {
            let _ = write_txn.open_table(store.definition())?;
        }
        write_txn.commit()?;

        Ok(store)
    }

    fn definition(&self) -> TableDefinition<'_, &'static str, &'static [u8]> {
        TableDefinition::new(&self.table)
    }
}

impl<V: Serialize + DeserializeOwned> Store<V> for RedbStore<V> {
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.definition())?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: V) -> StoreResult<()> {
        let json = serde_json::to_vec(&value)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.definition())?;
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<Option<V>> {
        let write_txn = self.db.begin_write()?;
        let previous = {
            let mut table = write_txn.open_table(self.definition())?;
            let removed = table.remove(key)?;
            match removed {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(previous)
    }

    fn entries(&self) -> StoreResult<Vec<(String, V)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.definition())?;

        let mut all = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            all.push((key.value().to_string(), serde_json::from_slice(value.value())?));
        }
        Ok(all)
    }
}
