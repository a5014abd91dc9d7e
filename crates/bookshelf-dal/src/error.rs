pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Duplicate value in unique field{}", .0.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
    DuplicateKey(Option<String>),

    #[error("No fields to update")]
    NothingToUpdate,
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::RecordNotFound("Book".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::DuplicateKey(db_err.constraint().map(str::to_string))
            }
            other => Error::DatabaseError(other),
        }
    }
}
