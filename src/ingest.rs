//! Ingestion pipeline orchestration.
//!
//! Coordinates the mirror flow: upstream fetch → normalization →
//! reconciliation against the local store. Reconciliation is
//! insert-if-absent keyed by external id; existing characters are never
//! updated.
//!
//! Startup calls [`IngestionService::initialize_if_empty`] once, after the
//! store and source have been built. The check-then-act in that method is
//! not locked; the SQLite backend's `UNIQUE(external_id)` constraint keeps
//! concurrent initializers from duplicating rows.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::mapper;
use crate::models::{ExternalCharacter, NewCharacter};
use crate::source::{CharacterSource, HttpCharacterSource};
use crate::sqlite_store::SqliteStore;
use crate::store::CharacterStore;

/// Counts produced by one [`IngestionService::reconcile`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Candidates passed in.
    pub received: usize,
    /// Rows the store actually inserted.
    pub inserted: u64,
    /// Candidates whose external id was already stored.
    pub skipped_existing: usize,
    /// Repeats of an external id seen earlier in the same batch.
    pub skipped_duplicate: usize,
}

/// Result of a fetch + reconcile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Records returned by the source, duplicates included.
    pub fetched: usize,
    pub reconcile: ReconcileReport,
}

/// What [`IngestionService::initialize_if_empty`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The store already held characters; nothing was fetched.
    AlreadyPopulated {
        /// Rows found in the store.
        count: u64,
    },
    /// The store was empty and a full sync ran.
    Ingested(SyncReport),
}

/// Moves upstream characters into the local store.
pub struct IngestionService {
    /// Where characters are fetched from.
    source: Arc<dyn CharacterSource>,
    /// Where new characters are persisted.
    store: Arc<dyn CharacterStore>,
}

impl IngestionService {
    pub fn new(source: Arc<dyn CharacterSource>, store: Arc<dyn CharacterStore>) -> Self {
        Self { source, store }
    }

    pub async fn fetch_all(&self) -> ServiceResult<Vec<ExternalCharacter>> {
        self.source.fetch_all().await
    }

    /// Persist every candidate whose external id is not stored yet.
    ///
    /// Repeated external ids within `candidates` are collapsed, first
    /// occurrence wins. All new rows go to the store in one bulk insert;
    /// when nothing is new the store is not written to at all.
    pub async fn reconcile(&self, candidates: &[NewCharacter]) -> ServiceResult<ReconcileReport> {
        let mut report = ReconcileReport {
            received: candidates.len(),
            ..Default::default()
        };

        let mut seen: HashSet<i64> = HashSet::with_capacity(candidates.len());
        let mut queued: Vec<NewCharacter> = Vec::new();

        for candidate in candidates {
            if !seen.insert(candidate.external_id) {
                report.skipped_duplicate += 1;
                continue;
            }

            let existing = self
                .store
                .find_by_external_id(candidate.external_id)
                .await
                .map_err(ServiceError::unexpected)?;

            match existing {
                Some(_) => report.skipped_existing += 1,
                None => queued.push(candidate.clone()),
            }
        }

        if queued.is_empty() {
            tracing::info!(received = report.received, "reconcile: nothing new to insert");
            return Ok(report);
        }

        report.inserted = self
            .store
            .insert_all(&queued)
            .await
            .map_err(ServiceError::unexpected)?;

        // Rows another writer stored between lookup and insert.
        let raced = queued.len().saturating_sub(report.inserted as usize);
        report.skipped_existing += raced;

        tracing::info!(
            received = report.received,
            inserted = report.inserted,
            skipped_existing = report.skipped_existing,
            skipped_duplicate = report.skipped_duplicate,
            "reconcile complete"
        );
        Ok(report)
    }

    /// Fetch the full upstream set and reconcile it, regardless of what the
    /// store already holds.
    pub async fn sync(&self) -> ServiceResult<SyncReport> {
        let records = self.fetch_all().await?;
        let candidates: Vec<NewCharacter> = records.iter().map(mapper::to_local).collect();
        let reconcile = self.reconcile(&candidates).await?;
        Ok(SyncReport {
            fetched: records.len(),
            reconcile,
        })
    }

    /// Populate the store from upstream if, and only if, it is empty.
    pub async fn initialize_if_empty(&self) -> ServiceResult<InitOutcome> {
        let count = self.store.count().await.map_err(ServiceError::unexpected)?;
        if count > 0 {
            tracing::info!(count, "store already populated, skipping initial ingestion");
            return Ok(InitOutcome::AlreadyPopulated { count });
        }

        tracing::info!("store is empty, running initial ingestion");
        self.sync().await.map(InitOutcome::Ingested)
    }
}

/// CLI entry point for `mirror sync`.
pub async fn run_sync(config: &Config, force: bool) -> Result<()> {
    let store = Arc::new(SqliteStore::open(config).await?);
    let source = Arc::new(HttpCharacterSource::new(&config.source)?);
    let service = IngestionService::new(source, store.clone());

    let outcome = if force {
        service.sync().await.map(InitOutcome::Ingested)
    } else {
        service.initialize_if_empty().await
    };
    store.pool().close().await;
    let outcome = outcome?;

    match outcome {
        InitOutcome::AlreadyPopulated { count } => {
            println!("sync (skipped)");
            println!("  store already holds {} characters", count);
            println!("  use --force to reconcile against upstream anyway");
        }
        InitOutcome::Ingested(report) => {
            println!("sync");
            println!("  fetched: {} characters", report.fetched);
            println!("  inserted: {}", report.reconcile.inserted);
            println!("  already present: {}", report.reconcile.skipped_existing);
            println!("  duplicates in batch: {}", report.reconcile.skipped_duplicate);
        }
    }
    println!("ok");
    Ok(())
}
