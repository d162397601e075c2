// File: crates/detailcrm_admin/src/bin/create_user.rs
use clap::Parser;
use detailcrm_admin::{bootstrap, create_user, new_user_request};
use detailcrm_common::CrmError;
use detailcrm_supabase::SupabaseClient;
use std::process::ExitCode;
use tracing::error;

/// Create a confirmed user with the service-role key.
#[derive(Parser)]
#[command(name = "create_user", version, about, long_about = None)]
struct Cli {
    #[arg(long)]
    email: String,

    #[arg(long, env = "DETAILCRM_NEW_USER_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    full_name: Option<String>,
}

async fn run(cli: Cli) -> Result<(), CrmError> {
    let config = bootstrap()?;
    let request = new_user_request(&cli.email, &cli.password, cli.full_name.as_deref())?;
    let client = SupabaseClient::new(&config.supabase);
    let user = create_user(&client, &request).await?;
    println!("{}", user.id);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("create_user failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
