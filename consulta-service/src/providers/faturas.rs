//! Invoice database bridge.
//!
//! The bridge wraps every answer as `{"status": "success", "data": ...}`;
//! any other status means nothing was found.

use serde_json::Value;

use common::errors::{AppError, AppResult};
use common::utils::http::join_url;

use super::{read_json, ProviderError};

const PROVIDER: &str = "Serviço de faturas";

#[derive(Clone)]
pub struct FaturasBridgeClient {
    http: reqwest::Client,
    base_url: String,
}

impl FaturasBridgeClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// Single invoice by number.
    pub async fn fatura(&self, numero: &str) -> AppResult<Value> {
        let url = join_url(&self.base_url, &format!("api/faturas/fatura/{numero}"));
        let body = self.get(&url, &[]).await?;
        unwrap_success(body).ok_or_else(|| AppError::NotFound("Fatura não encontrada".into()))
    }

    /// Filtered invoice search; returns `{"data": [...], "total": n}`.
    pub async fn fatura_dinamica(&self, filtros: &[(String, String)]) -> AppResult<Value> {
        let url = join_url(&self.base_url, "api/faturas/fatura-dinamica");
        let body = self.get(&url, filtros).await?;
        let total = body.get("total").cloned().unwrap_or(Value::from(0));
        match unwrap_success(body) {
            Some(data) => Ok(serde_json::json!({ "data": data, "total": total })),
            None => Err(AppError::NotFound("Nenhuma fatura encontrada".into())),
        }
    }

    async fn get(&self, url: &str, query: &[(String, String)]) -> AppResult<Value> {
        tracing::info!(provider = PROVIDER, url, "consultando faturas");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ProviderError::from)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Fatura não encontrada".into()));
        }
        Ok(read_json(PROVIDER, response).await?)
    }
}

fn unwrap_success(body: Value) -> Option<Value> {
    if body.get("status").and_then(Value::as_str) != Some("success") {
        return None;
    }
    match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    }
}
