use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::job::{JobFilters, JobRecord};
use crate::store::{InsertOutcome, JobStore};

/// Postgres-backed document store. The `jobs` table carries a primary key
/// on `id`, which is what makes concurrent ingestion safe.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert_if_absent(&self, job: &JobRecord) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query(
            "INSERT INTO jobs (id, title, company_name, location_name, description, url, job_type, salary_min, salary_max, salary_currency, skills, source, ingested_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.location_name)
        .bind(&job.description)
        .bind(&job.url)
        .bind(&job.job_type)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.salary_currency)
        .bind(&job.skills)
        .bind(&job.source)
        .bind(job.ingested_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, filters: &JobFilters) -> Result<Vec<JobRecord>, AppError> {
        filters.validate()?;

        let jobs = sqlx::query_as::<_, JobRecord>(
            "SELECT * FROM jobs WHERE ($1::text IS NULL OR company_name = $1) AND ($2::text IS NULL OR job_type = $2) AND ($3::text IS NULL OR location_name = $3) ORDER BY ingested_at, id LIMIT $4",
        )
        .bind(&filters.company)
        .bind(&filters.job_type)
        .bind(&filters.location)
        .bind(filters.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}
