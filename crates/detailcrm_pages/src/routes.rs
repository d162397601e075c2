// --- File: crates/detailcrm_pages/src/routes.rs ---

use axum::{routing::get, Router};
use detailcrm_supabase::Backend;
use std::sync::Arc;

use crate::handlers::{
    analytics_handler, board_handler, calendar_handler, dashboard_handler, metrics_handler,
    reviews_handler, settings_handler, PagesState,
};

/// Page routes, mounted at the application root.
pub fn routes(backend: Arc<dyn Backend>) -> Router {
    let state = Arc::new(PagesState { backend });

    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/board", get(board_handler))
        .route("/calendar", get(calendar_handler))
        .route("/analytics", get(analytics_handler))
        .route("/metrics", get(metrics_handler))
        .route("/reviews", get(reviews_handler))
        .route("/settings", get(settings_handler))
        .with_state(state)
}
