//! BigDataCorp people and companies datasets.
//!
//! Both endpoints take a JSON query (`q`, `Datasets`, optional `Limit`) and
//! authenticate with the `AccessToken` / `TokenId` header pair.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};

use common::config::BigDataCredentials;

use super::{read_json, ProviderError};

const PROVIDER: &str = "BigDataCorp";

#[derive(Clone)]
pub struct BigDataClient {
    http: reqwest::Client,
    pessoas_url: String,
    empresas_url: String,
    credentials: BigDataCredentials,
}

impl BigDataClient {
    pub fn new(
        http: reqwest::Client,
        pessoas_url: &str,
        empresas_url: &str,
        credentials: BigDataCredentials,
    ) -> Self {
        Self {
            http,
            pessoas_url: pessoas_url.to_string(),
            empresas_url: empresas_url.to_string(),
            credentials,
        }
    }

    pub async fn pessoas(&self, payload: &Value) -> Result<Value, ProviderError> {
        self.post(&self.pessoas_url, payload).await
    }

    pub async fn empresas(&self, payload: &Value) -> Result<Value, ProviderError> {
        self.post(&self.empresas_url, payload).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, ProviderError> {
        let headers = self.headers()?;
        tracing::info!(provider = PROVIDER, url, "consultando dataset");
        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(payload)
            .send()
            .await?;
        read_json(PROVIDER, response).await
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let (token, id) = self.credentials.pair().ok_or_else(|| {
            ProviderError::MissingCredentials(
                "As credenciais da BigDataCorp (BIGDATA_ACCESS_TOKEN e BIGDATA_TOKEN_ID) não estão configuradas.".into(),
            )
        })?;
        let invalid = |_| ProviderError::MissingCredentials("Credenciais da BigDataCorp inválidas.".into());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("AccessToken", HeaderValue::from_str(token).map_err(invalid)?);
        headers.insert("TokenId", HeaderValue::from_str(id).map_err(invalid)?);
        Ok(headers)
    }
}

/// `doc{...}` query for the basic registration of a CPF.
pub fn basic_data_payload(cpf: &str) -> Value {
    json!({ "q": format!("doc{{{cpf}}}"), "Datasets": "basic_data", "Limit": 1 })
}

/// Company relationships (partners, owners, legal representatives).
pub fn relationships_payload(cnpj: &str) -> Value {
    json!({ "q": format!("doc{{{cnpj}}}"), "Datasets": "relationships" })
}

/// Contact registration data (emails, phones, addresses) of a CPF.
pub fn registration_payload(cpf: &str) -> Value {
    json!({ "q": format!("doc{{{cpf}}}"), "Datasets": "registration_data" })
}

/// `Result[0].BasicData.TaxIdNumber` of a companies response.
pub fn first_tax_id(response: &Value) -> Option<String> {
    response
        .pointer("/Result/0/BasicData/TaxIdNumber")
        .and_then(Value::as_str)
        .map(str::to_string)
}
