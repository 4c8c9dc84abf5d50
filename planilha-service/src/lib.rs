//! Spreadsheet service
//!
//! - template spreadsheets for CPF, CNPJ and CEP uploads
//! - row-by-row lookups of uploaded spreadsheets through consulta-service
//! - bulk commercial consultation (company partners and their contacts)

pub mod client;
pub mod handlers;
pub mod layout;
pub mod massa;
pub mod routes;
pub mod service;
pub mod state;
pub mod workbook;

use axum::{middleware, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use common::middleware::{cors_layer, request_id_middleware};

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Planilha Service API",
        version = "0.1.0",
        description = "Planilhas modelo, processamento de planilhas e consulta comercial em massa"
    ),
    paths(
        handlers::health_check,
        handlers::baixar_modelo,
        handlers::processar,
        handlers::consulta_massa,
    ),
    components(schemas(
        service::ProcessamentoEntrada,
        service::MassaEntrada,
        common::models::OrigemConsulta,
        handlers::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "planilhas", description = "Planilhas de consulta"),
        (name = "health", description = "Health check")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(routes::router(&state))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
