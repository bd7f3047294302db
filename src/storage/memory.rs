// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{Store, StoreError, StoreResult};

/// `HashMap` behind a `RwLock`. Contents are lost on restart.
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> Store<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: V) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<Option<V>> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key))
    }

    fn entries(&self) -> StoreResult<Vec<(String, V)>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<(String, V)> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(store.get("alice").unwrap().is_none());

        store.put("alice", "0xabc".into()).unwrap();
        assert_eq!(store.get("alice").unwrap().as_deref(), Some("0xabc"));

        store.put("alice", "0xdef".into()).unwrap();
        assert_eq!(store.delete("alice").unwrap().as_deref(), Some("0xdef"));
        assert!(store.get("alice").unwrap().is_none());
        assert!(store.delete("alice").unwrap().is_none());
    }

    #[test]
    fn entries_are_sorted_by_key() {
        let store: MemoryStore<u32> = MemoryStore::new();
        store.put("b", 2).unwrap();
        store.put("a", 1).unwrap();

        let keys: Vec<String> = store.entries().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
