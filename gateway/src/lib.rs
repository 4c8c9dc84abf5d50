//! API gateway
//!
//! Single entry point for clients:
//! - forwards `/api/planilhas/**` to planilha-service
//! - forwards every other `/api/**` path to consulta-service
//! - aggregates the health of both services

pub mod proxy;
pub mod routes;
pub mod state;

use axum::{middleware, routing::get, Json, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use common::middleware::{cors_layer, request_id_middleware};

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back-office API Gateway",
        version = "0.1.0",
        description = "Ponto de entrada das consultas, seguros, cotações e planilhas"
    ),
    paths(
        routes::health_check,
        routes::aggregated_health,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::AggregatedHealth,
        routes::ServiceHealth,
    )),
    tags(
        (name = "health", description = "Health check")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(proxy::forward)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
