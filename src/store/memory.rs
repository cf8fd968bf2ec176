// In-memory collaborator implementations. Primarily test doubles for the
// pipeline and export paths, which only speak to the traits.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::job::{JobFilters, JobRecord};
use crate::store::{FingerprintCache, InsertOutcome, JobStore};

/// Job store holding records in a map keyed by `id`, insertion-checked the
/// same way the Postgres primary key would.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<BTreeMap<String, JobRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_if_absent(&self, job: &JobRecord) -> Result<InsertOutcome, AppError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Ok(InsertOutcome::DuplicateKey);
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find(&self, filters: &JobFilters) -> Result<Vec<JobRecord>, AppError> {
        filters.validate()?;
        let jobs = self.jobs.read().await;
        let mut matched: Vec<JobRecord> = jobs
            .values()
            .filter(|job| filters.matches(job))
            .cloned()
            .collect();
        if let Some(limit) = filters.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    keys: RwLock<HashSet<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FingerprintCache for MemoryCache {
    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.keys.read().await.contains(id))
    }

    async fn set(&self, id: &str) -> Result<(), AppError> {
        self.keys.write().await.insert(id.to_string());
        Ok(())
    }
}
