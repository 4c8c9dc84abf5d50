//! Gateway's own endpoints.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::utils::http::join_url;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/health/all", get(aggregated_health))
}

/// Gateway health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Gateway em execução", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Health of every backing service
#[utoipa::path(
    get,
    path = "/api/health/all",
    tag = "health",
    responses(
        (status = 200, description = "Estado agregado dos serviços", body = AggregatedHealth)
    )
)]
pub async fn aggregated_health(State(state): State<AppState>) -> Json<AggregatedHealth> {
    let urls = &state.service_urls;
    let (consulta, planilha) = tokio::join!(
        check_service_health(&state, "consulta-service", &urls.consulta_service),
        check_service_health(&state, "planilha-service", &urls.planilha_service),
    );
    let services = vec![consulta, planilha];

    let all_healthy = services.iter().all(|s| s.healthy);
    if !all_healthy {
        tracing::warn!(
            unhealthy = ?services.iter().filter(|s| !s.healthy).map(|s| &s.name).collect::<Vec<_>>(),
            "degraded backing services"
        );
    }

    Json(AggregatedHealth {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        services,
    })
}

async fn check_service_health(state: &AppState, name: &str, url: &str) -> ServiceHealth {
    let health_url = join_url(url, "/api/health");
    let result = state
        .http_client
        .get(&health_url)
        .timeout(state.config.http.timeout())
        .send()
        .await;

    let error = match result {
        Ok(response) if response.status().is_success() => None,
        Ok(response) => Some(format!("HTTP {}", response.status())),
        Err(e) => Some(e.to_string()),
    };

    ServiceHealth {
        name: name.to_string(),
        url: url.to_string(),
        healthy: error.is_none(),
        error,
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated health: `healthy` when every service answers, `degraded` otherwise.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AggregatedHealth {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub services: Vec<ServiceHealth>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ServiceHealth {
    pub name: String,
    pub url: String,
    pub healthy: bool,
    /// Failure reason when unhealthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
