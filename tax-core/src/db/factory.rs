//! Backend selection for the deduction store.
//!
//! Every backend ships a [`RepositoryFactory`]. The binary registers the ones
//! it links against in a [`RepositoryRegistry`] and opens the configured
//! backend through [`RepositoryRegistry::open`], which refuses a store that
//! is missing one of the deduction rows the calculation reads.

use async_trait::async_trait;
use tracing::{info, warn};

use super::repository::{DeductionRepository, RepositoryError};
use crate::models::{DeductionId, DeductionLimits};

/// Which backend to open and how to reach it.
///
/// `connection_string` is backend-specific: a file path or `:memory:` for
/// `sqlite`, ignored by `memory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name selected by [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Opens the store. Backends that persist rows are expected to migrate
    /// and seed the deduction table here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DeductionRepository>, RepositoryError>;
}

#[derive(Default)]
pub struct RepositoryRegistry {
    factories: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a backend. A later factory with the same name replaces the
    /// earlier one.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories
            .retain(|known| known.backend_name() != factory.backend_name());
        self.factories.push(factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.iter().map(|f| f.backend_name()).collect();
        names.sort_unstable();
        names
    }

    /// Opens the backend named in `config` and checks its deduction rows.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] for an unknown backend, or for a
    ///   store without a `personal` or `k-receipt` row.
    /// * Whatever the factory or the row lookup returns otherwise.
    ///
    /// A stored amount outside the bounds in `limits` is only logged; the
    /// bounds constrain updates, not the rows already present.
    pub async fn open(
        &self,
        config: &DbConfig,
        limits: &DeductionLimits,
    ) -> Result<Box<dyn DeductionRepository>, RepositoryError> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.backend_name() == config.backend)
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {}",
                    config.backend,
                    self.available_backends().join(", ")
                ))
            })?;

        let repo = factory.create(config).await?;
        check_deduction_rows(repo.as_ref(), &config.backend, limits).await?;
        info!(backend = %config.backend, "deduction store opened");
        Ok(repo)
    }
}

async fn check_deduction_rows(
    repo: &dyn DeductionRepository,
    backend: &str,
    limits: &DeductionLimits,
) -> Result<(), RepositoryError> {
    for id in DeductionId::ALL {
        let row = match repo.find_by_id(id).await {
            Ok(row) => row,
            Err(RepositoryError::NotFound) => {
                return Err(RepositoryError::Configuration(format!(
                    "backend '{backend}' has no '{id}' deduction row"
                )));
            }
            Err(err) => return Err(err),
        };

        let (min, max) = limits.bounds(id);
        if row.amount < min || row.amount > max {
            warn!(
                deduction = %id,
                amount = %row.amount,
                %min,
                %max,
                "stored deduction is outside the update bounds"
            );
        }
    }
    Ok(())
}
