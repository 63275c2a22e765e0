use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use quiz_refactor::error::FailureReport;
use quiz_refactor::migrate::{self, MigrationOptions};
use quiz_refactor::payload::RollbackPayloadInput;
use quiz_refactor::rollback::{self, RollbackRequest};
use quiz_refactor::{audit, dashboard};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use util::config;

#[derive(Parser, Debug)]
#[command(version, about = "Audit, migrate and roll back the podcast/quiz relationship")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the relationship audit
    Audit,
    /// Print the status dashboard
    Dashboard,
    /// Enforce one quiz per episode
    Migrate {
        /// Run every step, then roll the transaction back
        #[arg(long)]
        dry_run: bool,
        /// Continue even when validation reports issues
        #[arg(long)]
        force: bool,
        /// Write the rollback data to this file
        #[arg(long)]
        rollback_out: Option<PathBuf>,
    },
    /// Reverse a migration from its rollback data
    Rollback {
        /// JSON file written by `migrate --rollback-out`
        #[arg(long)]
        rollback_data: PathBuf,
        #[arg(long)]
        dry_run: bool,
        /// Treat missing rollback arrays as empty
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(config::log_level()).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let db = db::connect()
        .await
        .with_context(|| format!("Failed to connect to {}", config::database_url()))?;

    match args.command {
        Command::Audit => print_json(&audit::audit(&db).await?.into_response()),
        Command::Dashboard => print_json(&dashboard::build(&db).await?),
        Command::Migrate {
            dry_run,
            force,
            rollback_out,
        } => {
            let options = MigrationOptions {
                dry_run,
                force_execute: force,
            };
            let report = match migrate::run(&db, options).await {
                Ok(report) => report,
                Err(failure) => {
                    print_json(&FailureReport::from(&failure))?;
                    bail!(failure);
                }
            };

            if let Some(path) = rollback_out {
                if dry_run {
                    tracing::warn!("Dry run: not writing rollback data to {}", path.display());
                } else {
                    let json = serde_json::to_string_pretty(&report.rollback_data)?;
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Rollback data written to {}", path.display());
                }
            }

            print_json(&report)
        }
        Command::Rollback {
            rollback_data,
            dry_run,
            force,
        } => {
            let raw = fs::read_to_string(&rollback_data)
                .with_context(|| format!("Failed to read {}", rollback_data.display()))?;
            let input: RollbackPayloadInput = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid rollback data", rollback_data.display()))?;

            let request = RollbackRequest {
                rollback_data: Some(input),
                dry_run,
                force_rollback: force,
            };
            match rollback::run(&db, request).await {
                Ok(report) => print_json(&report),
                Err(failure) => {
                    print_json(&FailureReport::from(&failure))?;
                    bail!(failure);
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
