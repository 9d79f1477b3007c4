use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use tax_cli::app;
use tax_cli::commands::{BracketsCommand, CalculateCommand, DeductionCommand, UploadCommand};
use tax_core::{BracketTable, TaxError, TaxService};
use tax_core::db::DbConfig;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Personal income tax calculator.
///
/// Reads the deduction configuration from the selected backend and prints
/// every result as JSON on stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Database backend to use (`sqlite` or `memory`).
    #[arg(long, default_value = "sqlite", global = true)]
    backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `taxes.db`) or `:memory:`.
    #[arg(long, default_value = "taxes.db", global = true)]
    db: String,

    /// TOML file overriding the deduction caps and bounds.
    #[arg(long, global = true)]
    limits: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Calculate(CalculateCommand),
    Upload(UploadCommand),
    #[command(subcommand)]
    Deduction(DeductionCommand),
    Brackets(BracketsCommand),
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Writes to stderr so stdout carries only JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

async fn open_service(cli: &Cli) -> anyhow::Result<TaxService> {
    let limits = app::load_limits(cli.limits.as_deref())?;
    let db_config = DbConfig {
        backend: cli.backend.clone(),
        connection_string: cli.db.clone(),
    };
    app::open_service(&db_config, limits).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Calculate(cmd) => cmd.exec(&open_service(&cli).await?).await,
        Command::Upload(cmd) => cmd.exec(&open_service(&cli).await?).await,
        Command::Deduction(cmd) => cmd.exec(&open_service(&cli).await?).await,
        // The table is fixed; no store is needed.
        Command::Brackets(cmd) => cmd.exec(&BracketTable::standard()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    debug!(?cli, "starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TaxError>() {
                Some(tax_err) => {
                    error!(status = tax_err.status_code(), error = %tax_err, "request failed");
                    eprintln!("error: {}", tax_err.client_message());
                }
                None => {
                    error!(error = %format!("{err:#}"), "command failed");
                    eprintln!("error: {err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
