//! BrasilAPI: CEP and CNPJ registries.

use serde_json::Value;

use super::{read_json, ProviderError};

const PROVIDER: &str = "BrasilAPI";

#[derive(Clone)]
pub struct BrasilApiClient {
    http: reqwest::Client,
    cep_url: String,
    cnpj_url: String,
}

impl BrasilApiClient {
    pub fn new(http: reqwest::Client, cep_url: &str, cnpj_url: &str) -> Self {
        Self {
            http,
            cep_url: cep_url.to_string(),
            cnpj_url: cnpj_url.to_string(),
        }
    }

    /// Address for an 8-digit CEP.
    pub async fn cep(&self, cep: &str) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.cep_url, cep);
        tracing::info!(provider = PROVIDER, cep, "consultando CEP");
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound("CEP não encontrado.".into()));
        }
        let body = read_json(PROVIDER, response).await?;
        if body.get("erro").is_some() {
            return Err(ProviderError::NotFound("CEP não encontrado.".into()));
        }
        Ok(body)
    }

    /// Company registration for a 14-digit CNPJ.
    pub async fn cnpj(&self, cnpj: &str) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.cnpj_url, cnpj);
        tracing::info!(provider = PROVIDER, cnpj, "consultando CNPJ");
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound("CNPJ não encontrado.".into()));
        }
        read_json(PROVIDER, response).await
    }
}
