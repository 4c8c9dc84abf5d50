//! HTTP handlers.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::middleware::AuthUser;
use common::models::NivelAcesso;

use crate::layout::TipoPlanilha;
use crate::service::{Arquivo, MassaEntrada, PlanilhaService, ProcessamentoEntrada};
use crate::state::AppState;
use crate::workbook::{planilha_modelo, XLSX_CONTENT_TYPE};

pub(crate) const SERVICE: &str = "planilha-service";

fn anexo(arquivo: Arquivo) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", arquivo.nome),
            ),
        ],
        arquivo.bytes,
    )
        .into_response()
}

/// Download a template spreadsheet
#[utoipa::path(
    get,
    path = "/api/planilhas/modelo/{tipo}",
    tag = "planilhas",
    params(
        ("tipo" = String, Path, description = "cpf, cnpj ou cep")
    ),
    responses(
        (status = 200, description = "Planilha modelo", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 404, description = "Tipo de planilha inválido")
    )
)]
pub async fn baixar_modelo(Path(tipo): Path<String>) -> Result<Response, AppError> {
    let modelo = tipo.parse::<TipoPlanilha>()?.modelo();
    let bytes = planilha_modelo(&modelo)?;
    Ok(anexo(Arquivo {
        nome: modelo.arquivo.to_string(),
        bytes,
    }))
}

/// Look up every row of an uploaded spreadsheet
#[utoipa::path(
    post,
    path = "/api/planilhas/processar/{tipo}",
    tag = "planilhas",
    params(
        ("tipo" = String, Path, description = "cpf, cnpj ou cep")
    ),
    request_body = ProcessamentoEntrada,
    responses(
        (status = 200, description = "Planilha de resultados", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Tipo de planilha inválido")
    ),
    security(("bearer" = []))
)]
pub async fn processar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tipo): Path<String>,
    Json(entrada): Json<ProcessamentoEntrada>,
) -> Result<Response, AppError> {
    let tipo = tipo.parse::<TipoPlanilha>()?;
    let arquivo = PlanilhaService::new(state.consulta.clone())
        .processar(&user, tipo, entrada)
        .await?;
    Ok(anexo(arquivo))
}

/// Partners and contacts for a list of CNPJs
#[utoipa::path(
    post,
    path = "/api/planilhas/consulta-massa-comercial",
    tag = "planilhas",
    request_body = MassaEntrada,
    responses(
        (status = 200, description = "Planilha de sócios e contatos", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 400, description = "Lista de CNPJs vazia"),
        (status = 403, description = "Nível de acesso insuficiente")
    ),
    security(("bearer" = []))
)]
pub async fn consulta_massa(
    State(state): State<AppState>,
    user: AuthUser,
    Json(entrada): Json<MassaEntrada>,
) -> Result<Response, AppError> {
    if !matches!(user.nivel(), NivelAcesso::Admin | NivelAcesso::Comercial) {
        return Err(AppError::Forbidden(
            "Este usuário não possui nível de acesso para esta consulta em massa.".into(),
        ));
    }
    let arquivo = PlanilhaService::new(state.consulta.clone())
        .consulta_massa(&user, entrada)
        .await?;
    Ok(anexo(arquivo))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Serviço em execução", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
