// --- File: crates/services/detailcrm_backend/src/app.rs ---
use axum::Router;
use detailcrm_config::AppConfig;
use detailcrm_supabase::Backend;
use http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared, immutable state every feature router is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn Backend>,
    pub http: reqwest::Client,
}

/// Browser calls come from the app origin only; with no usable origin configured
/// the layer allows any origin without credentials.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(&config.app_url()) {
        Ok(origin) if config.app_url.is_some() => base
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        Ok(_) => base.allow_origin(AllowOrigin::any()),
        Err(e) => {
            warn!("Invalid app_url for CORS ({}), allowing any origin", e);
            base.allow_origin(AllowOrigin::any())
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let api_router = Router::new()
        .merge(detailcrm_common::routes())
        .merge(detailcrm_integrations::routes(
            state.config.clone(),
            state.backend.clone(),
            state.http.clone(),
        ));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new()
        .nest("/api", api_router)
        .merge(detailcrm_pages::routes(state.backend.clone()));

    #[cfg(feature = "openapi")]
    {
        use detailcrm_integrations::doc::IntegrationsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "detailcrm API",
                version = "0.1.0",
                description = "Vehicle detailing CRM backend"
            ),
            tags((name = "detailcrm", description = "Core service endpoints")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(IntegrationsApiDoc::openapi());
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
}
