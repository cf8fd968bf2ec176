// Ingest module.
// Drives one source file through normalize -> dedup gate -> store, keeping
// per-record counts. Record-local failures never abort the file; the store's
// unique key is the final word on duplicates.

pub mod normalize;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use crate::error::AppError;
use crate::models::job::JobRecord;
use crate::store::{FingerprintCache, InsertOutcome, JobStore};

/// Upper bound on any single store or cache round trip.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Attempts per store insert before the record counts as failed.
const INSERT_ATTEMPTS: u32 = 3;

/// Counts for one source file run. Partial success is the normal outcome,
/// not an error state.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IngestReport {
    pub total: u64,
    pub inserted: u64,
    pub skipped_duplicate: u64,
    pub failed: u64,
}

pub struct IngestPipeline {
    store: Arc<dyn JobStore>,
    cache: Arc<dyn FingerprintCache>,
    shutdown: Arc<AtomicBool>,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn JobStore>,
        cache: Arc<dyn FingerprintCache>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            cache,
            shutdown,
        }
    }

    /// Process one source file as a unit. Fails only when the file itself
    /// is unreadable or not iterable; everything record-local lands in the
    /// report counts instead.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestReport, AppError> {
        let source = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let text = tokio::fs::read_to_string(path).await?;
        let document: Value = serde_json::from_str(&text).map_err(|e| {
            AppError::MalformedSource(format!("{}: invalid JSON: {e}", path.display()))
        })?;
        let jobs = document
            .get("jobs")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                AppError::MalformedSource(format!(
                    "{}: missing or non-array 'jobs' key",
                    path.display()
                ))
            })?;

        tracing::info!("Found {} jobs in {}", jobs.len(), path.display());

        let mut report = IngestReport::default();
        for raw in jobs {
            // Stop between records, never mid-record. Counts so far stand.
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::warn!(
                    "Shutdown requested, stopping '{source}' after {} of {} records",
                    report.total,
                    jobs.len()
                );
                break;
            }
            report.total += 1;
            self.ingest_record(raw, &source, &mut report).await;
        }

        tracing::info!(
            "Run for '{source}' completed: {} total, {} inserted, {} duplicate, {} failed",
            report.total,
            report.inserted,
            report.skipped_duplicate,
            report.failed
        );
        Ok(report)
    }

    async fn ingest_record(&self, raw: &Value, source: &str, report: &mut IngestReport) {
        let job = match normalize::normalize(raw, source) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!("Skipping record from '{source}': {e}");
                report.failed += 1;
                return;
            }
        };

        if self.seen(&job.id).await {
            tracing::debug!("Job {} already ingested, skipping", job.id);
            report.skipped_duplicate += 1;
            return;
        }

        match self.insert_with_retry(&job).await {
            Ok(InsertOutcome::Inserted) => {
                self.mark_seen(&job.id).await;
                report.inserted += 1;
            }
            Ok(InsertOutcome::DuplicateKey) => {
                // Another run won the race, or the cache had forgotten the
                // fingerprint. Either way the record is already stored.
                self.mark_seen(&job.id).await;
                report.skipped_duplicate += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to persist job {}: {e}", job.id);
                report.failed += 1;
            }
        }
    }

    /// Cache lookup, failing open: an unreachable or slow cache means the
    /// record is treated as unseen and the store's unique key decides.
    async fn seen(&self, id: &str) -> bool {
        match timeout(CALL_TIMEOUT, self.cache.exists(id)).await {
            Ok(Ok(seen)) => seen,
            Ok(Err(e)) => {
                tracing::warn!("Cache check for {id} failed, treating as unseen: {e}");
                false
            }
            Err(_) => {
                tracing::warn!("Cache check for {id} timed out, treating as unseen");
                false
            }
        }
    }

    /// Record the fingerprint after a settled write. A lost cache write
    /// only costs a redundant store round trip on the next encounter.
    async fn mark_seen(&self, id: &str) {
        match timeout(CALL_TIMEOUT, self.cache.set(id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to cache fingerprint {id}: {e}"),
            Err(_) => tracing::warn!("Caching fingerprint {id} timed out"),
        }
    }

    async fn insert_with_retry(&self, job: &JobRecord) -> Result<InsertOutcome, AppError> {
        let mut attempt = 1;
        loop {
            let result = match timeout(CALL_TIMEOUT, self.store.insert_if_absent(job)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Connectivity(format!(
                    "Store insert timed out for job {}",
                    job.id
                ))),
            };
            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < INSERT_ATTEMPTS && e.is_retryable() => {
                    tracing::warn!(
                        "Insert attempt {attempt}/{INSERT_ATTEMPTS} for job {} failed: {e}",
                        job.id
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
