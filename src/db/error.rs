use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Table does not exist: {0}")]
    TableNotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Absent ids and tables are reported as negative results, not failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_) | DbError::TableNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
