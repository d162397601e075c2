// File: services/detailcrm_backend/src/main.rs
use detailcrm_backend::{build_app, AppState};
use detailcrm_common::{init_with_level, level_for_environment, HTTP_CLIENT};
use detailcrm_config::{load_config, redacted_json};
use detailcrm_supabase::SupabaseClient;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_with_level(level_for_environment(&config.environment));
    debug!("Loaded configuration: {}", redacted_json(&config));

    let backend = Arc::new(SupabaseClient::new(&config.supabase));
    let app = build_app(AppState {
        config: config.clone(),
        backend,
        http: HTTP_CLIENT.clone(),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
