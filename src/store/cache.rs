use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::store::FingerprintCache;

/// Fingerprint cache backed by its own small Postgres database, kept
/// separate from the document store so it can be wiped or lost without
/// touching the records themselves.
pub struct PgFingerprintCache {
    pool: PgPool,
}

impl PgFingerprintCache {
    /// Wrap a pool and make sure the fingerprint table exists. The cache
    /// is rebuildable, so a plain idempotent bootstrap is enough here and
    /// the store's migration machinery stays where the data of record is.
    pub async fn new(pool: PgPool) -> Result<Self, AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS fingerprints (id TEXT PRIMARY KEY, seen_at TIMESTAMPTZ NOT NULL DEFAULT NOW())",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl FingerprintCache for PgFingerprintCache {
    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM fingerprints WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn set(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO fingerprints (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
