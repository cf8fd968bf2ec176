// Store module.
// Traits for the two external collaborators: the document store holding
// canonical job records and the fingerprint cache used to skip redundant
// writes. Both are reached over the network; the unique key on `id` in the
// store is the authoritative dedup mechanism, the cache only an optimization.

mod cache;
#[cfg(test)]
mod memory;
mod postgres;

pub use cache::PgFingerprintCache;
#[cfg(test)]
pub use memory::{MemoryCache, MemoryStore};
pub use postgres::PgJobStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::job::{JobFilters, JobRecord};

/// Outcome of a conditional insert. A duplicate key is a normal result,
/// not an error: concurrent runs may both pass the dedup gate and race to
/// write the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateKey,
}

/// Document store holding canonical job records, keyed uniquely by `id`.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a record unless one with the same `id` already exists.
    async fn insert_if_absent(&self, job: &JobRecord) -> Result<InsertOutcome, AppError>;

    /// Fetch records matching the given filters, capped by `filters.limit`
    /// when present.
    async fn find(&self, filters: &JobFilters) -> Result<Vec<JobRecord>, AppError>;
}

/// Existence cache over record fingerprints. Bounded-latency contract;
/// callers treat any failure as "not seen" and fall through to the store.
#[async_trait]
pub trait FingerprintCache: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool, AppError>;

    async fn set(&self, id: &str) -> Result<(), AppError>;
}
