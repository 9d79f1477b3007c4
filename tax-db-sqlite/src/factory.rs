use std::path::PathBuf;

use async_trait::async_trait;
use tax_core::db::{DbConfig, DeductionRepository, RepositoryError, RepositoryFactory};
use tracing::{debug, error};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime.
///
/// Resolution order:
/// 1. `TAX_DB_SQLITE_SEEDS_DIR`, when set.
/// 2. `./seeds`, if that directory exists in the working directory.
/// 3. The crate's own `seeds/` directory.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAX_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// assert_eq!(registry.available_backends(), vec!["sqlite"]);
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database named by `config.connection_string`, apply the
    /// migrations and then the seeds.
    ///
    /// Seeds only insert missing rows, so amounts changed through an
    /// administrative update are kept across restarts.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DeductionRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await.map_err(|e| {
            error!(error = %format!("{e:#}"), "sqlite migrations failed");
            RepositoryError::Database(format!("{e:#}"))
        })?;

        let seeds = seeds_dir();
        debug!(seeds = %seeds.display(), "applying sqlite seeds");
        repo.run_seeds(&seeds).await.map_err(|e| {
            error!(error = %format!("{e:#}"), "sqlite seeding failed");
            RepositoryError::Database(format!("{e:#}"))
        })?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::DeductionId;
    use tax_core::db::DbConfig;

    use super::SqliteRepositoryFactory;
    use tax_core::db::RepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    /// Full round trip: factory to a seeded in-memory repository.
    #[tokio::test]
    async fn creates_seeded_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("failed to create in-memory repository");

        let personal = repo.find_by_id(DeductionId::Personal).await.unwrap();
        assert_eq!(personal.amount, dec!(60000));
    }
}
