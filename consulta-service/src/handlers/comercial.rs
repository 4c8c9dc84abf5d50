use axum::{extract::State, Json};

use common::errors::AppError;
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado, NivelAcesso};
use common::response::ApiResponse;

use crate::service::comercial::{EmpresaRegiao, FiltroRegiao};
use crate::service::ComercialService;
use crate::state::AppState;

use super::SERVICE;

const NIVEIS_COMERCIAIS: [NivelAcesso; 2] = [NivelAcesso::Admin, NivelAcesso::Comercial];

fn service(state: &AppState) -> ComercialService {
    ComercialService::new(
        state.providers.bigdata.clone(),
        state.providers.minhareceita.clone(),
        state.stores.historico.clone(),
    )
}

/// Company relationships (partners, representatives) by CNPJ
#[utoipa::path(
    post,
    path = "/api/consultas/comercial",
    tag = "comercial",
    request_body = ConsultaRequest,
    responses(
        (status = 200, description = "Consulta realizada", body = ApiResponse<ConsultaResultado>),
        (status = 403, description = "Nível de acesso insuficiente")
    ),
    security(("bearer" = []))
)]
pub async fn consultar_cnpj(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ConsultaRequest>,
) -> Result<Json<ApiResponse<ConsultaResultado>>, AppError> {
    user.require_any(&NIVEIS_COMERCIAIS)?;
    let data = service(&state).consultar_cnpj(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Contact data by CPF
#[utoipa::path(
    post,
    path = "/api/consultas/cont-comercial",
    tag = "comercial",
    request_body = ConsultaRequest,
    responses(
        (status = 200, description = "Consulta realizada", body = ApiResponse<ConsultaResultado>),
        (status = 403, description = "Nível de acesso insuficiente")
    ),
    security(("bearer" = []))
)]
pub async fn consultar_contato(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ConsultaRequest>,
) -> Result<Json<ApiResponse<ConsultaResultado>>, AppError> {
    user.require_any(&NIVEIS_COMERCIAIS)?;
    let data = service(&state).consultar_contato(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Real-estate agencies and administrators in a city
#[utoipa::path(
    post,
    path = "/api/consultas/comercial-regiao",
    tag = "comercial",
    request_body = FiltroRegiao,
    responses(
        (status = 200, description = "Empresas encontradas", body = ApiResponse<Vec<EmpresaRegiao>>),
        (status = 400, description = "UF e cidade são obrigatórios")
    ),
    security(("bearer" = []))
)]
pub async fn empresas_regiao(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(filtro): Json<FiltroRegiao>,
) -> Result<Json<ApiResponse<Vec<EmpresaRegiao>>>, AppError> {
    let data = service(&state).empresas_regiao(filtro).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}
