// --- File: crates/detailcrm_pages/src/handlers.rs ---

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::Utc;
use detailcrm_supabase::{resolve_session, Backend};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::loader::{
    load_analytics, load_board, load_calendar, load_dashboard, load_metrics, load_reviews,
    load_settings, PageContext,
};

pub const LOGIN_PATH: &str = "/login";

#[derive(Clone)]
pub struct PagesState {
    pub backend: Arc<dyn Backend>,
}

/// Resolve the session, then either redirect to the login page or render the loader's props.
async fn render<F, Fut, P>(state: &PagesState, headers: &HeaderMap, page: &str, load: F) -> Response
where
    F: FnOnce(PageContext) -> Fut,
    Fut: Future<Output = P>,
    P: Serialize,
{
    let Some(session) = resolve_session(state.backend.as_ref(), headers).await else {
        debug!("No session for /{}, redirecting to {}", page, LOGIN_PATH);
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let ctx = PageContext::new(state.backend.clone(), session);
    Json(load(ctx).await).into_response()
}

pub async fn dashboard_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "dashboard", |ctx| async move {
        load_dashboard(&ctx, Utc::now()).await
    })
    .await
}

pub async fn board_handler(State(state): State<Arc<PagesState>>, headers: HeaderMap) -> Response {
    render(&state, &headers, "board", |ctx| async move {
        load_board(&ctx).await
    })
    .await
}

pub async fn calendar_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "calendar", |ctx| async move {
        load_calendar(&ctx).await
    })
    .await
}

pub async fn analytics_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "analytics", |ctx| async move {
        load_analytics(&ctx).await
    })
    .await
}

pub async fn metrics_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "metrics", |ctx| async move {
        load_metrics(&ctx, Utc::now()).await
    })
    .await
}

pub async fn reviews_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "reviews", |ctx| async move {
        load_reviews(&ctx).await
    })
    .await
}

pub async fn settings_handler(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
) -> Response {
    render(&state, &headers, "settings", |ctx| async move {
        load_settings(&ctx).await
    })
    .await
}
