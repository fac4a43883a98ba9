//! Read queries over the local mirror.
//!
//! Both queries are stateless reads and may run concurrently with each
//! other and with ingestion. Used by the CLI (`mirror random`,
//! `mirror search`, `mirror list`) and the HTTP server.

use anyhow::Result;
use rand::Rng;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::mapper;
use crate::models::CharacterView;
use crate::sqlite_store::SqliteStore;
use crate::store::CharacterStore;

/// Accepts exactly `^[A-Za-z]+$`.
///
/// Spaces and hyphens are rejected, so a multi-word name can be stored but
/// only searched by one of its words.
pub fn is_valid_name_query(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic())
}

pub struct QueryService {
    store: Arc<dyn CharacterStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn CharacterStore>) -> Self {
        Self { store }
    }

    /// One character chosen uniformly at random from the current set.
    ///
    /// The set is read right before drawing so the index range always
    /// matches what is stored now.
    pub async fn get_random(&self) -> ServiceResult<CharacterView> {
        let characters = self
            .store
            .list_all()
            .await
            .map_err(ServiceError::unexpected)?;

        if characters.is_empty() {
            return Err(ServiceError::not_found());
        }

        let index = rand::thread_rng().gen_range(0..characters.len());
        Ok(mapper::to_view(&characters[index]))
    }

    /// Characters whose name contains `name`, ignoring case.
    ///
    /// Invalid input is rejected before the store is queried. No match is
    /// an empty result, not an error. Order is whatever the store returns.
    pub async fn search_by_name(&self, name: &str) -> ServiceResult<Vec<CharacterView>> {
        if !is_valid_name_query(name) {
            return Err(ServiceError::invalid_name());
        }

        let hits = self
            .store
            .search_by_name(name)
            .await
            .map_err(ServiceError::unexpected)?;

        Ok(hits.iter().map(mapper::to_view).collect())
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<CharacterView>> {
        let all = self
            .store
            .list_all()
            .await
            .map_err(ServiceError::unexpected)?;
        Ok(all.iter().map(mapper::to_view).collect())
    }
}

fn print_view(v: &CharacterView) {
    println!(
        "{:<6} {:<6} {:<32} {:<8} {}",
        v.id,
        v.external_id,
        v.name,
        v.status.label(),
        v.gender.label()
    );
}

fn print_header() {
    println!(
        "{:<6} {:<6} {:<32} {:<8} GENDER",
        "ID", "EXT", "NAME", "STATUS"
    );
}

async fn open_service(config: &Config) -> Result<(QueryService, Arc<SqliteStore>)> {
    let store = Arc::new(SqliteStore::open(config).await?);
    Ok((QueryService::new(store.clone()), store))
}

/// CLI entry point for `mirror random`.
pub async fn run_random(config: &Config) -> Result<()> {
    let (service, store) = open_service(config).await?;
    let result = service.get_random().await;
    store.pool().close().await;

    let view = result?;
    print_header();
    print_view(&view);
    Ok(())
}

/// CLI entry point for `mirror search <name>`.
pub async fn run_search(config: &Config, name: &str) -> Result<()> {
    // Validate before opening the database.
    if !is_valid_name_query(name) {
        return Err(ServiceError::invalid_name().into());
    }

    let (service, store) = open_service(config).await?;
    let result = service.search_by_name(name).await;
    store.pool().close().await;

    let views = result?;
    if views.is_empty() {
        println!("No results.");
        return Ok(());
    }
    print_header();
    for v in &views {
        print_view(v);
    }
    Ok(())
}

/// CLI entry point for `mirror list`.
pub async fn run_list(config: &Config) -> Result<()> {
    let (service, store) = open_service(config).await?;
    let result = service.list_all().await;
    store.pool().close().await;

    let views = result?;
    print_header();
    for v in &views {
        print_view(v);
    }
    println!("{} characters", views.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, Gender, NewCharacter, Status};
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn new_char(external_id: i64, name: &str) -> NewCharacter {
        NewCharacter {
            external_id,
            name: name.to_string(),
            status: Status::Alive,
            gender: Gender::Male,
        }
    }

    async fn seeded(names: &[(i64, &str)]) -> QueryService {
        let store = Arc::new(InMemoryStore::new());
        let batch: Vec<NewCharacter> = names.iter().map(|(id, n)| new_char(*id, n)).collect();
        store.insert_all(&batch).await.unwrap();
        QueryService::new(store)
    }

    fn names(views: &[CharacterView]) -> HashSet<String> {
        views.iter().map(|v| v.name.clone()).collect()
    }

    /// Store that counts every read; used to prove validation happens first.
    struct CountingStore {
        reads: AtomicU64,
    }

    #[async_trait]
    impl CharacterStore for CountingStore {
        async fn count(&self) -> anyhow::Result<u64> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
        async fn list_all(&self) -> anyhow::Result<Vec<Character>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn find_by_external_id(&self, _: i64) -> anyhow::Result<Option<Character>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
        async fn search_by_name(&self, _: &str) -> anyhow::Result<Vec<Character>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn insert_all(&self, _: &[NewCharacter]) -> anyhow::Result<u64> {
            Ok(0)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CharacterStore for BrokenStore {
        async fn count(&self) -> anyhow::Result<u64> {
            anyhow::bail!("database is locked")
        }
        async fn list_all(&self) -> anyhow::Result<Vec<Character>> {
            anyhow::bail!("database is locked")
        }
        async fn find_by_external_id(&self, _: i64) -> anyhow::Result<Option<Character>> {
            anyhow::bail!("database is locked")
        }
        async fn search_by_name(&self, _: &str) -> anyhow::Result<Vec<Character>> {
            anyhow::bail!("database is locked")
        }
        async fn insert_all(&self, _: &[NewCharacter]) -> anyhow::Result<u64> {
            anyhow::bail!("database is locked")
        }
    }

    #[test]
    fn test_name_pattern() {
        assert!(is_valid_name_query("rick"));
        assert!(is_valid_name_query("Rick"));
        assert!(!is_valid_name_query(""));
        assert!(!is_valid_name_query("123"));
        assert!(!is_valid_name_query("a1"));
        assert!(!is_valid_name_query("Rick Sanchez"));
        assert!(!is_valid_name_query("Mr-Meeseeks"));
        assert!(!is_valid_name_query("Rické"));
    }

    #[tokio::test]
    async fn test_random_on_empty_store_is_not_found() {
        let svc = seeded(&[]).await;
        let err = svc.get_random().await.unwrap_err();
        assert_eq!(err, ServiceError::not_found());
    }

    #[tokio::test]
    async fn test_random_single_character() {
        let svc = seeded(&[(1, "Rick Sanchez")]).await;
        for _ in 0..20 {
            assert_eq!(svc.get_random().await.unwrap().external_id, 1);
        }
    }

    #[tokio::test]
    async fn test_random_is_roughly_uniform() {
        let k = 5;
        let trials = 10_000;
        let svc = seeded(&[
            (1, "Rick Sanchez"),
            (2, "Morty Smith"),
            (3, "Summer Smith"),
            (4, "Beth Smith"),
            (5, "Jerry Smith"),
        ])
        .await;

        let mut counts: HashMap<i64, u32> = HashMap::new();
        for _ in 0..trials {
            let v = svc.get_random().await.unwrap();
            *counts.entry(v.external_id).or_default() += 1;
        }

        assert_eq!(counts.len(), k, "every character must be reachable");
        let expected = trials as f64 / k as f64;
        for (id, n) in counts {
            // sigma is 40 for these parameters; 300 is far outside noise
            let dev = (n as f64 - expected).abs();
            assert!(dev < 300.0, "external id {} drawn {} times", id, n);
        }
    }

    #[tokio::test]
    async fn test_search_scenario() {
        let svc = seeded(&[(1, "Rick Sanchez"), (2, "Morty Smith")]).await;

        let rick = svc.search_by_name("Rick").await.unwrap();
        assert_eq!(names(&rick), HashSet::from(["Rick Sanchez".to_string()]));

        let smith = svc.search_by_name("Smith").await.unwrap();
        assert_eq!(names(&smith), HashSet::from(["Morty Smith".to_string()]));

        assert!(svc.search_by_name("xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let svc = seeded(&[(1, "Rick Sanchez"), (2, "Morty Smith"), (3, "Tiny Rick")]).await;
        let lower = svc.search_by_name("rick").await.unwrap();
        let upper = svc.search_by_name("Rick").await.unwrap();
        assert_eq!(names(&lower), names(&upper));
        assert_eq!(lower.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_search_never_touches_store() {
        let store = Arc::new(CountingStore {
            reads: AtomicU64::new(0),
        });
        let svc = QueryService::new(store.clone());

        for bad in ["123", "", "a1", "Rick Sanchez", "%"] {
            let err = svc.search_by_name(bad).await.unwrap_err();
            assert_eq!(err, ServiceError::invalid_name(), "input {:?}", bad);
        }
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);

        assert!(svc.search_by_name("rick").await.is_ok());
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_unexpected() {
        let svc = QueryService::new(Arc::new(BrokenStore));
        assert!(matches!(
            svc.get_random().await,
            Err(ServiceError::Unexpected(_))
        ));
        assert!(matches!(
            svc.search_by_name("rick").await,
            Err(ServiceError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_maps_views() {
        let svc = seeded(&[(10, "Rick Sanchez"), (20, "Morty Smith")]).await;
        let all = svc.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|v| v.external_id == 20 && v.name == "Morty Smith"));
    }
}
