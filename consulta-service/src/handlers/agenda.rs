//! Commercial visit handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use common::errors::AppError;
use common::middleware::AuthUser;
use common::response::{ApiResponse, MessageData};

use crate::repository::Agendamento;
use crate::service::agenda::AgendamentoPayload;
use crate::service::{AgendaService, AgendaServiceTrait};
use crate::state::AppState;

use super::SERVICE;

fn service(state: &AppState) -> AgendaService {
    AgendaService::new(state.stores.agenda.clone())
}

/// List visits
#[utoipa::path(
    get,
    path = "/api/comercial/agenda",
    tag = "agenda",
    responses(
        (status = 200, description = "Agendamentos", body = ApiResponse<Vec<Agendamento>>)
    ),
    security(("bearer" = []))
)]
pub async fn list_agendamentos(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Vec<Agendamento>>>, AppError> {
    let data = service(&state).list().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Schedule a visit
#[utoipa::path(
    post,
    path = "/api/comercial/agenda",
    tag = "agenda",
    request_body = AgendamentoPayload,
    responses(
        (status = 200, description = "Agendamento criado", body = ApiResponse<Agendamento>)
    ),
    security(("bearer" = []))
)]
pub async fn create_agendamento(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AgendamentoPayload>,
) -> Result<Json<ApiResponse<Agendamento>>, AppError> {
    let data = service(&state).create(&user, payload).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Get a visit
#[utoipa::path(
    get,
    path = "/api/comercial/agenda/{id}",
    tag = "agenda",
    params(
        ("id" = i64, Path, description = "ID do agendamento")
    ),
    responses(
        (status = 200, description = "Agendamento", body = ApiResponse<Agendamento>),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("bearer" = []))
)]
pub async fn get_agendamento(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Agendamento>>, AppError> {
    let data = service(&state).get(id).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Replace a visit's fields
#[utoipa::path(
    put,
    path = "/api/comercial/agenda/{id}",
    tag = "agenda",
    params(
        ("id" = i64, Path, description = "ID do agendamento")
    ),
    request_body = AgendamentoPayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = ApiResponse<Agendamento>),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("bearer" = []))
)]
pub async fn update_agendamento(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AgendamentoPayload>,
) -> Result<Json<ApiResponse<Agendamento>>, AppError> {
    let data = service(&state).update(id, payload).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Delete a visit
#[utoipa::path(
    delete,
    path = "/api/comercial/agenda/{id}",
    tag = "agenda",
    params(
        ("id" = i64, Path, description = "ID do agendamento")
    ),
    responses(
        (status = 200, description = "Agendamento removido", body = ApiResponse<MessageData>),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("bearer" = []))
)]
pub async fn delete_agendamento(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageData>>, AppError> {
    service(&state).delete(id).await?;
    Ok(Json(ApiResponse::ok_with_service(
        MessageData::new("Agendamento removido com sucesso."),
        SERVICE,
    )))
}
