//! Registry lookups and history.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use common::errors::AppError;
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado, HistoricoItem, PageParams};
use common::response::{ApiResponse, PaginatedData};

use crate::service::{ConsultaService, ConsultaServiceTrait};
use crate::state::AppState;

use super::SERVICE;

fn service(state: &AppState) -> ConsultaService {
    ConsultaService::new(state.providers.clone(), state.stores.historico.clone())
}

/// Run a CPF, CNPJ or CEP lookup
#[utoipa::path(
    post,
    path = "/api/consultas/realizar",
    tag = "consultas",
    request_body = ConsultaRequest,
    responses(
        (status = 200, description = "Consulta realizada", body = ApiResponse<ConsultaResultado>),
        (status = 400, description = "Parâmetro inválido ou recusado pelo provedor"),
        (status = 503, description = "Provedor indisponível")
    ),
    security(("bearer" = []))
)]
pub async fn realizar(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ConsultaRequest>,
) -> Result<Json<ApiResponse<ConsultaResultado>>, AppError> {
    let data = service(&state).realizar(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Caller's lookup history (every user's for admins)
#[utoipa::path(
    get,
    path = "/api/consultas/historico",
    tag = "consultas",
    params(PageParams),
    responses(
        (status = 200, description = "Histórico paginado", body = ApiResponse<PaginatedData<HistoricoItem>>)
    ),
    security(("bearer" = []))
)]
pub async fn historico(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<PaginatedData<HistoricoItem>>>, AppError> {
    let data = service(&state).historico(&user, params).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// One history row
#[utoipa::path(
    get,
    path = "/api/consultas/historico/{id}",
    tag = "consultas",
    params(
        ("id" = i64, Path, description = "ID da consulta")
    ),
    responses(
        (status = 200, description = "Consulta", body = ApiResponse<HistoricoItem>),
        (status = 403, description = "Consulta de outro usuário"),
        (status = 404, description = "Consulta não encontrada")
    ),
    security(("bearer" = []))
)]
pub async fn historico_detalhe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<HistoricoItem>>, AppError> {
    let data = service(&state).historico_detalhe(&user, id).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// One user's lookup history
#[utoipa::path(
    get,
    path = "/api/consultas/historico/usuario/{user_id}",
    tag = "consultas",
    params(
        ("user_id" = i64, Path, description = "ID do usuário"),
        PageParams
    ),
    responses(
        (status = 200, description = "Histórico paginado", body = ApiResponse<PaginatedData<HistoricoItem>>),
        (status = 403, description = "Somente administradores ou o próprio usuário")
    ),
    security(("bearer" = []))
)]
pub async fn historico_usuario(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<PaginatedData<HistoricoItem>>>, AppError> {
    let data = service(&state)
        .historico_usuario(&user, user_id, params)
        .await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}
