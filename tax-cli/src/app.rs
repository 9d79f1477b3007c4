//! Startup wiring: backend registry, deduction limits and the tax service.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tax_core::db::{DbConfig, InMemoryRepositoryFactory, RepositoryRegistry};
use tax_core::{DeductionLimits, TaxRequest, TaxService};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::debug;

/// Registry with every backend this binary ships: `sqlite` and `memory`.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(InMemoryRepositoryFactory));
    registry
}

/// Parse deduction limits from TOML. Keys left out keep their defaults.
///
/// ```toml
/// donation_cap = 100000
/// personal_min = 10000
/// personal_max = 100000
/// k_receipt_min = 0
/// k_receipt_max = 100000
/// ```
pub fn parse_limits(text: &str) -> Result<DeductionLimits> {
    let limits: DeductionLimits = toml::from_str(text).context("Invalid deduction limits")?;
    limits.validate().context("Invalid deduction limits")?;
    Ok(limits)
}

/// Limits from `path`, or the defaults when no file is given.
pub fn load_limits(path: Option<&Path>) -> Result<DeductionLimits> {
    let Some(path) = path else {
        return Ok(DeductionLimits::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read limits file '{}'", path.display()))?;
    let limits =
        parse_limits(&text).with_context(|| format!("In limits file '{}'", path.display()))?;
    debug!(path = %path.display(), ?limits, "deduction limits loaded");
    Ok(limits)
}

/// Connect to the configured backend and build a service over it.
pub async fn open_service(
    db_config: &DbConfig,
    limits: DeductionLimits,
) -> Result<TaxService> {
    debug!("connecting to {} backend", db_config.backend);
    let repo = build_registry()
        .open(db_config, &limits)
        .await
        .with_context(|| format!("Failed to open '{}' backend", db_config.backend))?;
    Ok(TaxService::new(Arc::from(repo), limits))
}

/// Read a calculation request body from a JSON file.
pub fn read_request(path: &Path) -> Result<TaxRequest> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open request file '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse request file '{}'", path.display()))
}
