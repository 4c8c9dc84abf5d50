//! ViaCEP reverse lookup: state + city + street to candidate CEPs.

use reqwest::Url;
use serde_json::{json, Value};

use super::{read_json, ProviderError};

const PROVIDER: &str = "ViaCEP";

#[derive(Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// Returns `{"resultados_viacep": [...]}` with at least one address.
    pub async fn buscar_por_endereco(
        &self,
        uf: &str,
        cidade: &str,
        logradouro: &str,
    ) -> Result<Value, ProviderError> {
        let url = self.url(&[uf, cidade, logradouro, "json"])?;
        tracing::info!(provider = PROVIDER, uf, cidade, logradouro, "consultando CEP por endereço");
        let response = self.http.get(url).send().await?;
        let body = read_json(PROVIDER, response).await?;

        match body {
            Value::Array(items) if !items.is_empty() => Ok(json!({ "resultados_viacep": items })),
            Value::Array(_) => Err(ProviderError::NotFound(
                "Nenhum CEP encontrado para o endereço informado.".into(),
            )),
            Value::Object(ref map) if map.contains_key("erro") => Err(ProviderError::NotFound(
                "Endereço não encontrado no ViaCEP.".into(),
            )),
            other => Err(ProviderError::InvalidResponse {
                provider: PROVIDER,
                reason: format!("formato inesperado: {other}"),
            }),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let invalid = |reason: String| ProviderError::InvalidResponse {
            provider: PROVIDER,
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL base não aceita caminho".into()))?
            .pop_if_empty()
            .extend(segments);
        // ViaCEP expects a trailing slash after `json`.
        url.path_segments_mut()
            .map_err(|_| invalid("URL base não aceita caminho".into()))?
            .push("");
        Ok(url)
    }
}
