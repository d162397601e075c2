// File: crates/detailcrm_admin/src/bin/setup_storage.rs
use clap::Parser;
use detailcrm_admin::{bootstrap, bucket_spec, setup_storage, DEFAULT_BUCKET, DEFAULT_MAX_SIZE_MB};
use detailcrm_common::CrmError;
use detailcrm_supabase::{BucketStatus, SupabaseClient};
use std::process::ExitCode;
use tracing::error;

/// Create the job photo bucket if it does not exist.
#[derive(Parser)]
#[command(name = "setup_storage", version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = DEFAULT_BUCKET)]
    bucket: String,

    /// Make objects readable without a signed URL
    #[arg(long)]
    public: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_SIZE_MB)]
    max_size_mb: u64,
}

async fn run(cli: Cli) -> Result<(), CrmError> {
    let bucket = bucket_spec(&cli.bucket, cli.public, cli.max_size_mb)?;
    let config = bootstrap()?;
    let client = SupabaseClient::new(&config.supabase);
    match setup_storage(&client, &bucket).await? {
        BucketStatus::Created => println!("Created bucket '{}'", bucket.id),
        BucketStatus::AlreadyExists => println!("Bucket '{}' already exists", bucket.id),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("setup_storage failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
