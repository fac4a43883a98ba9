//! Storage abstraction for Character Mirror.
//!
//! The [`CharacterStore`] trait is the only view the ingestion and query
//! services have of persistence: scan, filter, lookup by external id, and
//! all-or-nothing bulk insert. Two backends ship with the crate:
//!
//! | Backend | Module |
//! |---------|--------|
//! | SQLite (sqlx) | [`crate::sqlite_store`] |
//! | In-memory | [`memory`] |
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Character, NewCharacter};

/// Abstract storage backend for characters.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`count`](CharacterStore::count) | Number of stored characters |
/// | [`list_all`](CharacterStore::list_all) | Full scan |
/// | [`find_by_external_id`](CharacterStore::find_by_external_id) | Reconciliation lookup |
/// | [`search_by_name`](CharacterStore::search_by_name) | Case-insensitive substring filter |
/// | [`insert_all`](CharacterStore::insert_all) | Atomic bulk insert |
#[async_trait]
pub trait CharacterStore: Send + Sync {
    async fn count(&self) -> Result<u64>;

    /// Every stored character, in store-defined order.
    async fn list_all(&self) -> Result<Vec<Character>>;

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Character>>;

    /// Characters whose name contains `fragment`, ignoring ASCII case.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Character>>;

    /// Insert a batch as one unit: either every row is applied or none is.
    ///
    /// A row whose `external_id` is already stored is skipped rather than
    /// failing the batch. Returns the number of rows actually inserted.
    async fn insert_all(&self, characters: &[NewCharacter]) -> Result<u64>;
}
