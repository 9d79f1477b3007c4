use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DeductionConfig, DeductionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Store of the deduction configuration rows (`personal`, `k-receipt`).
///
/// The tax service reads through this trait on every calculation and never
/// caches the result. Implementations are not expected to make an update
/// and its read-back atomic.
#[async_trait]
pub trait DeductionRepository: Send + Sync {
    /// Current row for `id`, or [`RepositoryError::NotFound`].
    async fn find_by_id(
        &self,
        id: DeductionId,
    ) -> Result<DeductionConfig, RepositoryError>;

    /// Sets the amount of `id` and returns the number of rows affected.
    async fn update_by_id(
        &self,
        id: DeductionId,
        amount: Decimal,
    ) -> Result<u64, RepositoryError>;

    /// Every stored row, in [`DeductionId`] order.
    async fn list_all(&self) -> Result<Vec<DeductionConfig>, RepositoryError>;
}
