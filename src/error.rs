//! Error taxonomy for the ingestion and query services.
//!
//! Collaborator failures (store, HTTP client, JSON decoding) are converted
//! into one of these four kinds at the service boundary. Raw
//! `anyhow`/`reqwest`/`sqlx` errors never leave a service method.

use thiserror::Error;

pub const NO_CHARACTERS: &str = "No characters found in the database.";
pub const INVALID_NAME: &str = "Invalid name format";
pub const EXTERNAL_FAILURE: &str = "Failed to fetch data from external API.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A read that needs at least one character found none.
    #[error("{0}")]
    NotFound(String),

    /// Caller input was rejected before the store was touched.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream fetch failed: bad status, missing payload, or transport.
    #[error("{0}")]
    ExternalSource(String),

    #[error("Unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn not_found() -> Self {
        ServiceError::NotFound(NO_CHARACTERS.to_string())
    }

    pub fn invalid_name() -> Self {
        ServiceError::InvalidInput(INVALID_NAME.to_string())
    }

    pub fn external() -> Self {
        ServiceError::ExternalSource(EXTERNAL_FAILURE.to_string())
    }

    /// Wrap a store or other collaborator failure, logging the full chain.
    pub fn unexpected(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "unexpected collaborator failure");
        ServiceError::Unexpected(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
