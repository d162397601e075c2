// File: crates/detailcrm_admin/src/bin/migrate_columns.rs
use clap::Parser;
use detailcrm_admin::{bootstrap, bootstrap_offline, migrate_columns, planned_migrations};
use detailcrm_common::CrmError;
use std::process::ExitCode;
use tracing::error;

/// Add missing columns to the hosted database. Safe to re-run.
#[derive(Parser)]
#[command(name = "migrate_columns", version, about, long_about = None)]
struct Cli {
    /// Print the statements without loading config or connecting
    #[arg(long)]
    dry_run: bool,
}

async fn run(cli: Cli) -> Result<(), CrmError> {
    if cli.dry_run {
        bootstrap_offline();
        for statement in planned_migrations() {
            println!("{statement};");
        }
        return Ok(());
    }

    let config = bootstrap()?;
    let statements = migrate_columns(&config).await?;
    for statement in &statements {
        println!("{statement};");
    }
    println!("-- applied {} statements", statements.len());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("migrate_columns failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
