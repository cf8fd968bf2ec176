use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobfeed", about = "Job posting ingestion and export pipeline")]
pub struct Config {
    /// Document store connection URL
    #[arg(long, env = "STORE_URL", default_value = "postgres://localhost:5432")]
    pub store_url: String,

    /// Database name, appended when the store URL carries no database path
    #[arg(long, env = "STORE_DATABASE", default_value = "jobs_data")]
    pub store_db: String,

    /// Dedup cache connection URL
    #[arg(long, env = "CACHE_URL", default_value = "postgres://localhost:5432/jobs_cache")]
    pub cache_url: String,

    /// Run store migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true")]
    pub run_migrations: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest one or more JSON source files into the store
    Ingest {
        /// Paths of source files to process
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// Export stored jobs to a CSV file
    Export {
        /// Output CSV file path
        #[arg(long, default_value = "jobs.csv")]
        output: std::path::PathBuf,

        /// Filter by exact company name
        #[arg(long)]
        company: Option<String>,

        /// Filter by exact job type (e.g. Full-time, Contract)
        #[arg(long)]
        job_type: Option<String>,

        /// Filter by exact location name
        #[arg(long)]
        location: Option<String>,

        /// Maximum number of results to export
        #[arg(long)]
        limit: Option<i64>,
    },
}

impl Config {
    /// Resolve the store DSN, appending the database name when the URL
    /// has no path component of its own.
    pub fn store_dsn(&self) -> String {
        let base = self.store_url.trim_end_matches('/');
        let after_scheme = base.split_once("://").map(|(_, rest)| rest).unwrap_or(base);
        if after_scheme.contains('/') {
            base.to_string()
        } else {
            format!("{base}/{}", self.store_db)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(store_url: &str) -> Config {
        Config::parse_from([
            "jobfeed",
            "--store-url",
            store_url,
            "ingest",
            "jobs.json",
        ])
    }

    #[test]
    fn store_dsn_appends_database_name() {
        let config = config_with("postgres://localhost:5432");
        assert_eq!(config.store_dsn(), "postgres://localhost:5432/jobs_data");
    }

    #[test]
    fn store_dsn_keeps_explicit_database() {
        let config = config_with("postgres://localhost:5432/custom");
        assert_eq!(config.store_dsn(), "postgres://localhost:5432/custom");
    }
}
