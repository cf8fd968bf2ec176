mod config;
mod db;
mod error;
mod export;
mod ingest;
mod models;
mod store;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};
use crate::ingest::IngestPipeline;
use crate::models::job::JobFilters;
use crate::store::{JobStore, PgFingerprintCache, PgJobStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobfeed=info")),
        )
        .init();

    let config = Config::parse();

    tracing::info!("Connecting to document store...");
    let store_pool = db::create_pool(&config.store_dsn()).await?;

    if config.run_migrations {
        tracing::info!("Running store migrations...");
        db::run_migrations(&store_pool).await?;
    }

    let store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(store_pool));

    match config.command {
        Command::Ingest { files } => {
            tracing::info!("Connecting to dedup cache...");
            let cache_pool = db::create_pool(&config.cache_url).await?;
            let cache = Arc::new(PgFingerprintCache::new(cache_pool).await?);

            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, stopping after the current record");
                    flag.store(true, Ordering::Relaxed);
                }
            });

            let pipeline = IngestPipeline::new(store, cache, shutdown.clone());
            for file in &files {
                // One bad file never takes down the rest of the batch.
                if let Err(e) = pipeline.ingest_file(file).await {
                    tracing::error!("Ingest of {} failed: {e}", file.display());
                }
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }
        }
        Command::Export {
            output,
            company,
            job_type,
            location,
            limit,
        } => {
            let filters = JobFilters {
                company,
                job_type,
                location,
                limit,
            };
            filters.validate()?;

            let jobs = store.find(&filters).await?;
            tracing::info!("Query returned {} results", jobs.len());
            if jobs.is_empty() {
                tracing::warn!("No data found matching the query criteria");
            }

            let count = export::write_csv(&output, jobs).await?;
            tracing::info!("Exported {count} records to {}", output.display());
        }
    }

    Ok(())
}
