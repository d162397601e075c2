// File: crates/detailcrm_integrations/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{AuthUrlResponse, DisconnectRequest, DisconnectResponse};
use crate::providers::Provider;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::google_initiate_handler,
        crate::handlers::google_disconnect_handler,
        crate::handlers::gmail_auth_handler,
        crate::handlers::gmail_disconnect_handler,
        crate::handlers::gmb_auth_handler,
        crate::handlers::gmb_disconnect_handler,
        crate::handlers::outlook_auth_handler,
        crate::handlers::outlook_disconnect_handler,
    ),
    components(schemas(AuthUrlResponse, DisconnectRequest, DisconnectResponse, Provider)),
    tags((name = "Integrations", description = "Third-party account connections"))
)]
pub struct IntegrationsApiDoc;
