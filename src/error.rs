#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed source file: {0}")]
    MalformedSource(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether a failed store call is worth another attempt.
    /// Unique violations never reach this point; the store maps them to a
    /// duplicate-key outcome before an error is surfaced.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity(_)
                | AppError::Database(sqlx::Error::PoolTimedOut)
                | AppError::Database(sqlx::Error::Io(_))
        )
    }
}
