use sea_orm::DbErr;
use thiserror::Error;

/// Failure reported by a repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store error")]
    Database(#[from] DbErr),
    #[error("{0} not found")]
    Missing(&'static str),
}
