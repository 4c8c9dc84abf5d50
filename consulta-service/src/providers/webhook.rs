//! Insurance webhook: insured lists, invoices, administrators and payment slips.

use serde_json::Value;

use common::errors::{AppError, AppResult};
use common::utils::http::join_url;

use super::{read_json, ProviderError};

const PROVIDER: &str = "Webhook de seguros";

/// Insurance line with an insured-list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramo {
    Vida,
    Incendio,
}

impl Ramo {
    fn path(&self) -> &'static str {
        match self {
            Ramo::Vida => "vida/",
            Ramo::Incendio => "incendio/",
        }
    }
}

#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    boletos_http: reqwest::Client,
    base_url: String,
}

impl WebhookClient {
    pub fn new(http: reqwest::Client, boletos_http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            boletos_http,
            base_url: base_url.to_string(),
        }
    }

    pub async fn segurados(&self, ramo: Ramo, params: &[(String, String)]) -> AppResult<Value> {
        self.get_with_detail(ramo.path(), params).await
    }

    pub async fn faturas(&self, params: &[(String, String)]) -> AppResult<Value> {
        self.get_with_detail("faturas/", params).await
    }

    /// Administrator autocomplete.
    pub async fn administradoras(&self, termo: &str, page_size: u32) -> AppResult<Value> {
        let url = join_url(&self.base_url, "administradoras/");
        let response = self
            .http
            .get(url)
            .query(&[("administradora", termo.to_string()), ("page_size", page_size.to_string())])
            .send()
            .await
            .map_err(ProviderError::from)?;
        Ok(read_json(PROVIDER, response).await?)
    }

    /// Payment slips of a policy/invoice number, relayed with the upstream status.
    pub async fn boletos(&self, numero: &str) -> AppResult<Value> {
        let url = join_url(&self.base_url, "boletofedbnk/boletos/");
        let response = self
            .boletos_http
            .get(url)
            .query(&[("numero", numero)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = PROVIDER, error = %e, "boletos indisponível");
                AppError::ExternalService("Serviço de boletos indisponível".into())
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                AppError::ExternalService(format!("Resposta inválida do serviço de boletos: {e}"))
            });
        }
        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        Err(AppError::Upstream {
            status: status.as_u16(),
            message: "Erro ao consultar boletos".into(),
            details: Some(details),
        })
    }

    /// GET that surfaces the upstream `detail` field on failure.
    async fn get_with_detail(&self, path: &str, params: &[(String, String)]) -> AppResult<Value> {
        let url = join_url(&self.base_url, path);
        tracing::info!(provider = PROVIDER, url = %url, filtros = params.len(), "consultando webhook");
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(read_json(PROVIDER, response).await?);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").map(|d| d.as_str().map(String::from).unwrap_or_else(|| d.to_string())))
            .unwrap_or_else(|| format!("{PROVIDER} respondeu {status}"));
        tracing::warn!(provider = PROVIDER, status = status.as_u16(), detail = %detail, "consulta recusada");
        Err(AppError::ExternalService(detail))
    }
}
