//! MinhaReceita company search by CNAE and state.

use serde_json::Value;

use super::{read_json, ProviderError};

const PROVIDER: &str = "MinhaReceita";

#[derive(Clone)]
pub struct MinhaReceitaClient {
    http: reqwest::Client,
    base_url: String,
}

impl MinhaReceitaClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// Companies registered under `cnae` in `uf`.
    ///
    /// Accepts both a bare array and a `{"data": [...]}` envelope.
    pub async fn por_cnae(&self, cnae: &str, uf: &str) -> Result<Vec<Value>, ProviderError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("cnae", cnae), ("uf", uf)])
            .send()
            .await?;
        let body = read_json(PROVIDER, response).await?;

        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ProviderError::InvalidResponse {
                        provider: PROVIDER,
                        reason: "objeto sem a lista 'data'".into(),
                    })
                }
            },
            _ => {
                return Err(ProviderError::InvalidResponse {
                    provider: PROVIDER,
                    reason: "resposta não é uma lista".into(),
                })
            }
        };
        tracing::debug!(provider = PROVIDER, cnae, uf, total = items.len(), "empresas recebidas");
        Ok(items)
    }
}
