//! Client for the lookup endpoints of consulta-service.
//!
//! Every call forwards the caller's bearer token, so consulta-service applies
//! its own access rules and records the history under the caller.

use common::errors::{AppError, AppResult};
use common::models::{ConsultaRequest, ConsultaResultado};
use common::response::ApiResponse;
use common::utils::http::join_url;

const REALIZAR: &str = "/api/consultas/realizar";
const COMERCIAL: &str = "/api/consultas/comercial";
const CONTATO: &str = "/api/consultas/cont-comercial";

#[derive(Clone)]
pub struct ConsultaClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConsultaClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// CPF, CNPJ or CEP lookup.
    pub async fn realizar(&self, token: &str, req: &ConsultaRequest) -> AppResult<ConsultaResultado> {
        self.post(REALIZAR, token, req).await
    }

    /// Company relationships lookup (`cnpj_comercial`).
    pub async fn comercial(&self, token: &str, req: &ConsultaRequest) -> AppResult<ConsultaResultado> {
        self.post(COMERCIAL, token, req).await
    }

    /// Person contact lookup (`comercial`).
    pub async fn contato(&self, token: &str, req: &ConsultaRequest) -> AppResult<ConsultaResultado> {
        self.post(CONTATO, token, req).await
    }

    async fn post(
        &self,
        path: &str,
        token: &str,
        req: &ConsultaRequest,
    ) -> AppResult<ConsultaResultado> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(url = %url, tipo = %req.tipo_consulta, "chamando consulta-service");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Erro na comunicação com a API de consulta: {e}"))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            AppError::ExternalService(format!("Erro na comunicação com a API de consulta: {e}"))
        })?;

        let envelope: ApiResponse<ConsultaResultado> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) => {
                return Err(AppError::Upstream {
                    status: status.as_u16(),
                    message: format!(
                        "Resposta inesperada da API de consulta: {}",
                        String::from_utf8_lossy(&bytes)
                    ),
                    details: None,
                })
            }
        };

        match envelope.into_result() {
            Ok(data) if status.is_success() => Ok(data),
            Ok(_) => Err(AppError::Upstream {
                status: status.as_u16(),
                message: "Resposta da API de consulta incompleta ou inesperada.".into(),
                details: None,
            }),
            Err(error) => Err(AppError::Upstream {
                status: status.as_u16(),
                message: error.message,
                details: error.details,
            }),
        }
    }
}

/// Text written to the error column of a spreadsheet row.
pub fn detalhe_falha(err: &AppError) -> String {
    match err {
        AppError::Upstream { status, message, .. } => {
            format!("Erro na consulta à API ({status}): {message}")
        }
        other => other.to_string(),
    }
}
