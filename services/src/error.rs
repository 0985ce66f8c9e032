use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy shared by every domain operation.
///
/// Routes map these onto the 4xx family; only `Db` surfaces as a server
/// fault. `RowValidation` carries the originating sheet row (header = row 1,
/// first data row = 2) and aborts its whole batch.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Row {row}: {message}")]
    RowValidation { row: usize, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn row(row: usize, message: impl Into<String>) -> Self {
        Self::RowValidation {
            row,
            message: message.into(),
        }
    }
}
