use axum::{extract::State, Json};

use common::errors::AppError;
use common::middleware::AuthUser;
use common::response::ApiResponse;

use crate::service::cotacao::{CotacaoEntrada, CotacaoResultado};
use crate::service::CotacaoService;
use crate::state::AppState;

use super::SERVICE;

/// Price a contents fire-insurance quote
#[utoipa::path(
    post,
    path = "/api/cotacao/incendio-conteudo",
    tag = "cotacao",
    request_body = CotacaoEntrada,
    responses(
        (status = 200, description = "Cotação calculada", body = ApiResponse<CotacaoResultado>),
        (status = 400, description = "Valores inválidos")
    ),
    security(("bearer" = []))
)]
pub async fn incendio_conteudo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(entrada): Json<CotacaoEntrada>,
) -> Result<Json<ApiResponse<CotacaoResultado>>, AppError> {
    let service = CotacaoService::new(
        state.stores.cotacoes.clone(),
        state.stores.historico.clone(),
    );
    let data = service.incendio_conteudo(&user, entrada).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}
