use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tax_core::{DeductionConfig, DeductionId, DeductionRepository, RepositoryError};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (and create if missing) the database at `database_url`.
    ///
    /// Accepts a bare file path, `:memory:`, or a sqlx URL such as
    /// `sqlite:taxes.db`. An in-memory database is held on a single
    /// connection so every query sees the same data.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?
            .create_if_missing(true);
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        debug!(database_url, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(seed = %path.display(), "seed applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_deduction_config(row: &SqliteRow) -> Result<DeductionConfig, RepositoryError> {
    let raw_id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let id = DeductionId::parse(&raw_id).ok_or_else(|| {
        RepositoryError::Database(format!("Unknown deduction id '{raw_id}'"))
    })?;

    Ok(DeductionConfig {
        id,
        amount: get_decimal(row, "amount")?,
        description: row
            .try_get("description")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {e}")))?,
    })
}

#[async_trait]
impl DeductionRepository for SqliteRepository {
    async fn find_by_id(
        &self,
        id: DeductionId,
    ) -> Result<DeductionConfig, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, amount, description, updated_at
             FROM tax_deduct_config WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_deduction_config(&row)
    }

    async fn update_by_id(
        &self,
        id: DeductionId,
        amount: Decimal,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE tax_deduct_config SET amount = ?, updated_at = ? WHERE id = ?",
        )
        .bind(decimal_to_text(amount))
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn list_all(&self) -> Result<Vec<DeductionConfig>, RepositoryError> {
        let rows = sqlx::query("SELECT id, amount, description, updated_at FROM tax_deduct_config")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut configs = rows
            .iter()
            .map(row_to_deduction_config)
            .collect::<Result<Vec<_>, _>>()?;
        configs.sort_by_key(|config| config.id);
        Ok(configs)
    }
}
