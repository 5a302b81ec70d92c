use sea_orm::error::DbErr;
use thiserror::Error;

/// Error type shared by all domain services.
///
/// An unresolved ingredient reference is deliberately NOT represented here:
/// it is a defined state of the costing pipeline (see
/// `services::catalog::ResolvedIngredient`), not a failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: String, found: String },

    #[error("Referential integrity: {0}")]
    ReferentialIntegrity(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status transition: {0}")]
    InvalidStatus(String),

    #[error("Event error: {0}")]
    EventError(String),
}

impl ServiceError {
    /// Wraps a database error.
    pub fn db_error(err: DbErr) -> Self {
        ServiceError::DatabaseError(err)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }
}
