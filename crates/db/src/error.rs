use quarry_core::error::CoreError;

/// Error type returned by the service layer.
///
/// Repositories return plain [`sqlx::Error`]; services wrap them here and add
/// domain failures from [`CoreError`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (not found, invalid argument, conflict).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The underlying read or write failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Classify a sqlx error.
    ///
    /// PostgreSQL unique violations (code 23505) on a constraint whose name
    /// starts with `uq_` become [`CoreError::Conflict`]; everything else stays
    /// a database error.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                    return StoreError::Core(CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )));
                }
            }
        }
        StoreError::Database(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Core(CoreError::NotFound { .. }))
    }
}
