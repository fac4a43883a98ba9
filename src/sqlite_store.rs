//! SQLite-backed [`CharacterStore`] implementation.
//!
//! Maps each store operation onto the `characters` table created by
//! [`crate::migrate`]. Status and gender are persisted as their display
//! labels.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::mapper::{gender_from_label, status_from_label};
use crate::migrate;
use crate::models::{Character, NewCharacter};
use crate::store::CharacterStore;

/// SQLite implementation of the [`CharacterStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::migrate_pool(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_character(row: &SqliteRow) -> Character {
    let status: String = row.get("status");
    let gender: String = row.get("gender");
    Character {
        id: row.get("id"),
        external_id: row.get("external_id"),
        name: row.get("name"),
        status: status_from_label(&status),
        gender: gender_from_label(&gender),
    }
}

#[async_trait]
impl CharacterStore for SqliteStore {
    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM characters")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn list_all(&self) -> Result<Vec<Character>> {
        let rows = sqlx::query("SELECT id, external_id, name, status, gender FROM characters")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_character).collect())
    }

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Character>> {
        let row = sqlx::query(
            "SELECT id, external_id, name, status, gender FROM characters WHERE external_id = ?",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_character))
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Character>> {
        let rows = sqlx::query(
            r#"
            SELECT id, external_id, name, status, gender
            FROM characters
            WHERE LOWER(name) LIKE '%' || LOWER(?) || '%'
            "#,
        )
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_character).collect())
    }

    async fn insert_all(&self, characters: &[NewCharacter]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for c in characters {
            let result = sqlx::query(
                r#"
                INSERT INTO characters (external_id, name, status, gender)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(external_id) DO NOTHING
                "#,
            )
            .bind(c.external_id)
            .bind(&c.name)
            .bind(c.status.label())
            .bind(c.gender.label())
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
