//! In-memory [`CharacterStore`] implementation for tests and embedding.
//!
//! Uses a `Vec` behind `std::sync::RwLock`. Ids come from a counter that
//! only moves forward, so they are never reused.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Character, NewCharacter};

use super::CharacterStore;

struct Inner {
    rows: Vec<Character>,
    next_id: i64,
}

/// In-memory character store.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    insert_calls: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: Vec::new(),
                next_id: 1,
            }),
            insert_calls: AtomicU64::new(0),
        }
    }

    /// Number of times [`CharacterStore::insert_all`] reached the store.
    pub fn insert_calls(&self) -> u64 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CharacterStore for InMemoryStore {
    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.rows.len() as u64)
    }

    async fn list_all(&self) -> Result<Vec<Character>> {
        Ok(self.read()?.rows.clone())
    }

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Character>> {
        Ok(self
            .read()?
            .rows
            .iter()
            .find(|c| c.external_id == external_id)
            .cloned())
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Character>> {
        let needle = fragment.to_ascii_lowercase();
        Ok(self
            .read()?
            .rows
            .iter()
            .filter(|c| c.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn insert_all(&self, characters: &[NewCharacter]) -> Result<u64> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        // Single write guard for the whole batch keeps it atomic to readers.
        let mut inner = self.write()?;
        let mut inserted = 0u64;
        for new in characters {
            if inner.rows.iter().any(|c| c.external_id == new.external_id) {
                continue;
            }
            let id = inner.next_id;
            inner.next_id += 1;
            inner.rows.push(Character {
                id,
                external_id: new.external_id,
                name: new.name.clone(),
                status: new.status,
                gender: new.gender,
            });
            inserted += 1;
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Status};

    fn new_char(external_id: i64, name: &str) -> NewCharacter {
        NewCharacter {
            external_id,
            name: name.to_string(),
            status: Status::Alive,
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn test_ids_assigned_in_order() {
        let store = InMemoryStore::new();
        store
            .insert_all(&[new_char(10, "Rick Sanchez"), new_char(20, "Morty Smith")])
            .await
            .unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all[0].id, 1);
        assert_eq!(all[1].id, 2);
        assert_eq!(all[1].external_id, 20);
    }

    #[tokio::test]
    async fn test_existing_external_id_skipped() {
        let store = InMemoryStore::new();
        assert_eq!(store.insert_all(&[new_char(1, "Rick")]).await.unwrap(), 1);
        assert_eq!(store.insert_all(&[new_char(1, "Rick")]).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.insert_calls(), 2);
    }

    #[tokio::test]
    async fn test_search_ignores_case() {
        let store = InMemoryStore::new();
        store
            .insert_all(&[new_char(1, "Rick Sanchez"), new_char(2, "Morty Smith")])
            .await
            .unwrap();
        let hits = store.search_by_name("SANCH").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Rick Sanchez");
        assert!(store.search_by_name("xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_external_id() {
        let store = InMemoryStore::new();
        store.insert_all(&[new_char(5, "Summer Smith")]).await.unwrap();
        assert!(store.find_by_external_id(5).await.unwrap().is_some());
        assert!(store.find_by_external_id(6).await.unwrap().is_none());
    }
}
