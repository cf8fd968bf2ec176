use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Canonical flat form of a job posting. Built once by the normalizer,
/// written once by the pipeline, never mutated afterwards. `id` is the
/// source-provided identifier and doubles as the dedup fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub location_name: String,
    pub description: String,
    pub url: String,
    pub job_type: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: String,
    pub skills: Vec<String>,
    pub source: String,
    pub ingested_at: DateTime<Utc>,
}

/// Optional exact-match criteria for the export query. Absent fields are
/// unconstrained; present fields compose with AND.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct JobFilters {
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub limit: Option<i64>,
}

impl JobFilters {
    /// Reject malformed filter input at the boundary instead of silently
    /// coercing it. An empty filter string would otherwise read as "match
    /// records with an empty field", which is never what a caller means.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("company", &self.company),
            ("job-type", &self.job_type),
            ("location", &self.location),
        ] {
            if let Some(v) = value
                && v.is_empty()
            {
                return Err(AppError::BadRequest(format!(
                    "Filter '{name}' must not be empty"
                )));
            }
        }
        if let Some(limit) = self.limit
            && limit <= 0
        {
            return Err(AppError::BadRequest(format!(
                "Limit must be positive, got {limit}"
            )));
        }
        Ok(())
    }

    /// Exact-match predicate over one record, AND across present fields.
    /// The Postgres store expresses the same predicate in SQL; this form
    /// backs the in-memory store.
    #[allow(dead_code)]
    pub fn matches(&self, job: &JobRecord) -> bool {
        self.company.as_ref().is_none_or(|c| *c == job.company_name)
            && self.job_type.as_ref().is_none_or(|t| *t == job.job_type)
            && self.location.as_ref().is_none_or(|l| *l == job.location_name)
    }
}
