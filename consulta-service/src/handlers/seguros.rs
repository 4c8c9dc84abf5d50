//! Insurance and invoice handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use common::errors::AppError;
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado};
use common::response::ApiResponse;

use crate::service::seguros::FiltroFaturas;
use crate::service::SegurosService;
use crate::state::AppState;

use super::SERVICE;

fn service(state: &AppState) -> SegurosService {
    SegurosService::new(
        state.providers.webhook.clone(),
        state.providers.faturas.clone(),
        state.stores.historico.clone(),
    )
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdministradorasQuery {
    pub administradora: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoletosQuery {
    pub numero: Option<String>,
}

/// Life or fire insured list
#[utoipa::path(
    post,
    path = "/api/consultas/segurados",
    tag = "seguros",
    request_body = ConsultaRequest,
    responses(
        (status = 200, description = "Consulta realizada", body = ApiResponse<ConsultaResultado>),
        (status = 503, description = "Webhook indisponível")
    ),
    security(("bearer" = []))
)]
pub async fn segurados(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ConsultaRequest>,
) -> Result<Json<ApiResponse<ConsultaResultado>>, AppError> {
    let data = service(&state).segurados(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Invoice search through the webhook
#[utoipa::path(
    post,
    path = "/api/consultas/faturas",
    tag = "seguros",
    request_body = ConsultaRequest,
    responses(
        (status = 200, description = "Consulta realizada", body = ApiResponse<ConsultaResultado>),
        (status = 503, description = "Webhook indisponível")
    ),
    security(("bearer" = []))
)]
pub async fn faturas(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ConsultaRequest>,
) -> Result<Json<ApiResponse<ConsultaResultado>>, AppError> {
    let data = service(&state).faturas(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Administrator autocomplete
#[utoipa::path(
    get,
    path = "/api/administradoras",
    tag = "seguros",
    params(AdministradorasQuery),
    responses(
        (status = 200, description = "Administradoras")
    ),
    security(("bearer" = []))
)]
pub async fn administradoras(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<AdministradorasQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let data = service(&state)
        .administradoras(query.administradora.as_deref(), query.page_size)
        .await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Payment slips of a policy or invoice
#[utoipa::path(
    get,
    path = "/api/boletos",
    tag = "seguros",
    params(BoletosQuery),
    responses(
        (status = 200, description = "Boletos"),
        (status = 400, description = "Número ausente"),
        (status = 503, description = "Serviço de boletos indisponível")
    ),
    security(("bearer" = []))
)]
pub async fn boletos(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<BoletosQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let data = service(&state).boletos(query.numero.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Invoice by number
#[utoipa::path(
    get,
    path = "/api/consultas/fatura/{numero}",
    tag = "seguros",
    params(
        ("numero" = String, Path, description = "Número da fatura")
    ),
    responses(
        (status = 200, description = "Fatura"),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("bearer" = []))
)]
pub async fn fatura(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(numero): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let data = service(&state).fatura(&numero).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Invoice search by any combination of filters
#[utoipa::path(
    get,
    path = "/api/consultas/fatura/fatura-dinamica",
    tag = "seguros",
    params(FiltroFaturas),
    responses(
        (status = 200, description = "Faturas e total"),
        (status = 404, description = "Nenhuma fatura encontrada")
    ),
    security(("bearer" = []))
)]
pub async fn fatura_dinamica(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filtro): Query<FiltroFaturas>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let data = service(&state).fatura_dinamica(&filtro).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}
