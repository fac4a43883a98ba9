//! Core data models used throughout Character Mirror.
//!
//! These types represent the records that flow through the ingestion
//! pipeline (upstream shape → local entity) and the query layer
//! (local entity → response view).

use serde::{Deserialize, Serialize};

/// Life status of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Alive,
    Dead,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Alive, Status::Dead, Status::Unknown];

    /// Canonical display label, also the persisted and serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Dead => "Dead",
            Status::Unknown => "Unknown",
        }
    }
}

/// Gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    /// Canonical display label, also the persisted and serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

/// A character as returned by the upstream catalog, before normalization.
///
/// `status` and `gender` are free-form; missing or `null` values are
/// accepted and later resolve to `Unknown`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalCharacter {
    /// Upstream identifier, stored locally as `external_id`.
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A normalized character that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharacter {
    pub external_id: i64,
    pub name: String,
    pub status: Status,
    pub gender: Gender,
}

/// A character stored locally. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub status: Status,
    pub gender: Gender,
}

/// Outbound shape returned by the query layer and the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub status: Status,
    pub gender: Gender,
}
