//! Database error types.

use revision_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid data for item {id}: {reason}")]
    InvalidData { id: String, reason: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(e) => StoreError::Backend(e.to_string()),
            DbError::InvalidData { id, reason } => StoreError::Corrupt { id, reason },
        }
    }
}
