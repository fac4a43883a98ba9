//! Upstream character catalog.
//!
//! [`CharacterSource`] is the seam between the ingestion service and the
//! network. [`HttpCharacterSource`] talks to the real catalog; it follows
//! `info.next` links until the last page so a single `fetch_all` call
//! returns the complete set.
//!
//! # Failure classification
//!
//! Every failure is surfaced as [`ServiceError::ExternalSource`]:
//! - non-2xx response status
//! - 2xx with an empty body, a body that is not the expected JSON envelope,
//!   or a missing/`null` `results` array
//! - transport errors (timeout, connection refused, DNS)
//! - a pagination chain that loops or exceeds `source.max_pages`
//!
//! No retry is attempted. A page with `"results": []` is a valid, empty
//! result.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ExternalCharacter;

#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// Retrieve the complete upstream character set.
    async fn fetch_all(&self) -> ServiceResult<Vec<ExternalCharacter>>;
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    info: Option<PageInfo>,
    #[serde(default)]
    results: Option<Vec<ExternalCharacter>>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    next: Option<String>,
}

/// HTTP client for the upstream catalog.
pub struct HttpCharacterSource {
    client: reqwest::Client,
    start_url: String,
    max_pages: usize,
}

impl HttpCharacterSource {
    /// Build a client whose requests are bounded by `source.timeout_secs`.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            start_url: config.character_url(),
            max_pages: config.max_pages,
        })
    }

    /// Fetch one page, returning its records and the `info.next` link.
    async fn fetch_page(
        &self,
        url: &str,
    ) -> ServiceResult<(Vec<ExternalCharacter>, Option<String>)> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(url, error = %e, "error while fetching characters from upstream");
            ServiceError::external()
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, %status, "upstream returned non-success status");
            return Err(ServiceError::external());
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(url, error = %e, "error while reading upstream response body");
            ServiceError::external()
        })?;

        if body.is_empty() {
            tracing::error!(url, "upstream response body is empty");
            return Err(ServiceError::external());
        }

        let page: Page = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(url, error = %e, "upstream response body is not a character page");
            ServiceError::external()
        })?;

        let results = page.results.ok_or_else(|| {
            tracing::error!(url, "upstream response has no results");
            ServiceError::external()
        })?;

        let next = page
            .info
            .and_then(|info| info.next)
            .filter(|next| !next.trim().is_empty());

        Ok((results, next))
    }
}

#[async_trait]
impl CharacterSource for HttpCharacterSource {
    async fn fetch_all(&self) -> ServiceResult<Vec<ExternalCharacter>> {
        let mut url = self.start_url.clone();
        let mut visited: HashSet<String> = HashSet::new();
        let mut all = Vec::new();

        for page_no in 1..=self.max_pages {
            visited.insert(url.clone());
            let (results, next) = self.fetch_page(&url).await?;
            tracing::debug!(page = page_no, count = results.len(), "fetched upstream page");
            all.extend(results);

            match next {
                None => {
                    tracing::info!(pages = page_no, total = all.len(), "upstream fetch complete");
                    return Ok(all);
                }
                Some(next) if visited.contains(&next) => {
                    tracing::error!(url = %next, "upstream pagination loops back to a visited page");
                    return Err(ServiceError::external());
                }
                Some(next) => url = next,
            }
        }

        tracing::error!(
            max_pages = self.max_pages,
            "upstream pagination exceeded source.max_pages"
        );
        Err(ServiceError::external())
    }
}

/// In-process source returning a fixed record list.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<ExternalCharacter>,
}

impl StaticSource {
    pub fn new(records: Vec<ExternalCharacter>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CharacterSource for StaticSource {
    async fn fetch_all(&self) -> ServiceResult<Vec<ExternalCharacter>> {
        Ok(self.records.clone())
    }
}
