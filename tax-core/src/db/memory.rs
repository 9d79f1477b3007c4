use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{DeductionRepository, RepositoryError};
use crate::models::{DeductionConfig, DeductionId};

/// Process-local deduction store. Useful for tests and for running the
/// calculator without a database.
#[derive(Debug, Default)]
pub struct InMemoryDeductionRepository {
    rows: RwLock<HashMap<DeductionId, DeductionConfig>>,
}

impl InMemoryDeductionRepository {
    /// An empty store; every lookup fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the shipped defaults: personal 60000, k-receipt 50000.
    pub fn with_defaults() -> Self {
        Self::from_amounts([
            (DeductionId::Personal, dec!(60000)),
            (DeductionId::KReceipt, dec!(50000)),
        ])
    }

    pub fn from_amounts(amounts: impl IntoIterator<Item = (DeductionId, Decimal)>) -> Self {
        let now = Utc::now();
        let rows = amounts
            .into_iter()
            .map(|(id, amount)| {
                let config = DeductionConfig {
                    id,
                    amount,
                    description: id.label().to_string(),
                    updated_at: now,
                };
                (id, config)
            })
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    fn poisoned(_: impl std::fmt::Display) -> RepositoryError {
        RepositoryError::Database("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl DeductionRepository for InMemoryDeductionRepository {
    async fn find_by_id(
        &self,
        id: DeductionId,
    ) -> Result<DeductionConfig, RepositoryError> {
        let rows = self.rows.read().map_err(Self::poisoned)?;
        rows.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn update_by_id(
        &self,
        id: DeductionId,
        amount: Decimal,
    ) -> Result<u64, RepositoryError> {
        let mut rows = self.rows.write().map_err(Self::poisoned)?;
        match rows.get_mut(&id) {
            Some(row) => {
                row.amount = amount;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_all(&self) -> Result<Vec<DeductionConfig>, RepositoryError> {
        let rows = self.rows.read().map_err(Self::poisoned)?;
        let mut all: Vec<_> = rows.values().cloned().collect();
        all.sort_by_key(|row| row.id);
        Ok(all)
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. The connection string
/// is ignored; every repository starts from the shipped defaults.
pub struct InMemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for InMemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn DeductionRepository>, RepositoryError> {
        Ok(Box::new(InMemoryDeductionRepository::with_defaults()))
    }
}
