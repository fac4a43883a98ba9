//! # Character Mirror
//!
//! Mirrors a remote character catalog into a local SQLite store and
//! answers two read queries against the local copy: one character at
//! random, and a case-insensitive search by name fragment.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  Upstream   │──▶│  Normalize  │──▶│  Reconcile  │
//! │  (HTTP)     │   │  (mapper)   │   │ (ingest)    │
//! └─────────────┘   └─────────────┘   └──────┬──────┘
//!                                            ▼
//!                                     ┌─────────────┐
//!                                     │   SQLite    │
//!                                     └──────┬──────┘
//!                      ┌─────────────────────┤
//!                      ▼                     ▼
//!                 ┌──────────┐         ┌──────────┐
//!                 │   CLI    │         │   HTTP   │
//!                 │ (mirror) │         │  (axum)  │
//!                 └──────────┘         └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mirror init                 # create database
//! mirror sync                 # populate from upstream if empty
//! mirror search rick
//! mirror random
//! mirror serve                # initial sync + HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`mapper`] | Upstream → local → view normalization |
//! | [`error`] | Service error taxonomy |
//! | [`source`] | Upstream catalog client |
//! | [`store`] | Storage trait and in-memory backend |
//! | [`sqlite_store`] | SQLite backend |
//! | [`ingest`] | Fetch + reconcile pipeline |
//! | [`query`] | Random pick and name search |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod mapper;
pub mod migrate;
pub mod models;
pub mod query;
pub mod server;
pub mod source;
pub mod sqlite_store;
pub mod store;
