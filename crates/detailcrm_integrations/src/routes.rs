// --- File: crates/detailcrm_integrations/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use detailcrm_config::AppConfig;
use detailcrm_supabase::Backend;
use std::sync::Arc;

use crate::handlers::{
    gmail_auth_handler, gmail_callback_handler, gmail_disconnect_handler, gmb_auth_handler,
    gmb_callback_handler, gmb_disconnect_handler, google_callback_handler,
    google_disconnect_handler, google_initiate_handler, outlook_auth_handler,
    outlook_callback_handler, outlook_disconnect_handler, IntegrationsState,
};

/// OAuth routes, relative to `/api`.
pub fn routes(config: Arc<AppConfig>, backend: Arc<dyn Backend>, http: reqwest::Client) -> Router {
    let state = Arc::new(IntegrationsState {
        config,
        backend,
        http,
    });

    Router::new()
        .route("/auth/google/initiate", get(google_initiate_handler))
        .route("/auth/google/disconnect", post(google_disconnect_handler))
        .route("/auth/google/callback", get(google_callback_handler))
        .route("/integrations/gmail/auth", get(gmail_auth_handler))
        .route("/integrations/gmail/disconnect", post(gmail_disconnect_handler))
        .route("/integrations/gmail/callback", get(gmail_callback_handler))
        .route("/integrations/gmb/auth", get(gmb_auth_handler))
        .route("/integrations/gmb/disconnect", post(gmb_disconnect_handler))
        .route("/integrations/gmb/callback", get(gmb_callback_handler))
        .route("/integrations/outlook/auth", get(outlook_auth_handler))
        .route(
            "/integrations/outlook/disconnect",
            post(outlook_disconnect_handler),
        )
        .route("/integrations/outlook/callback", get(outlook_callback_handler))
        .with_state(state)
}
