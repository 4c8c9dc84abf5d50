//! Clients for the third-party registries and internal bridges.

pub mod bigdatacorp;
pub mod brasilapi;
pub mod faturas;
pub mod minhareceita;
pub mod viacep;
pub mod webhook;

use serde_json::Value;
use thiserror::Error;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::utils::http::build_client;

pub use bigdatacorp::BigDataClient;
pub use brasilapi::BrasilApiClient;
pub use faturas::FaturasBridgeClient;
pub use minhareceita::MinhaReceitaClient;
pub use viacep::ViaCepClient;
pub use webhook::WebhookClient;

/// Failure talking to a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or timeout.
    #[error("Erro de comunicação com a API externa: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered 4xx.
    #[error("{provider} recusou a consulta ({status}): {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Provider answered 5xx.
    #[error("{provider} indisponível ({status}): {body}")]
    Unavailable {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Lookup succeeded but found nothing.
    #[error("{0}")]
    NotFound(String),

    #[error("{provider} retornou uma resposta inválida: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("{0}")]
    MissingCredentials(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected { .. } | ProviderError::NotFound(_) => {
                AppError::BadRequest(err.to_string())
            }
            ProviderError::MissingCredentials(msg) => AppError::Config(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

/// Reads a provider response as JSON, classifying error statuses.
pub(crate) async fn read_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<Value, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider,
                reason: e.to_string(),
            });
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(provider, status = status.as_u16(), body = %body, "provider returned an error status");
    if status.is_client_error() {
        Err(ProviderError::Rejected {
            provider,
            status: status.as_u16(),
            body,
        })
    } else {
        Err(ProviderError::Unavailable {
            provider,
            status: status.as_u16(),
            body,
        })
    }
}

/// Every outbound client the service uses.
#[derive(Clone)]
pub struct Providers {
    pub brasilapi: BrasilApiClient,
    pub bigdata: BigDataClient,
    pub viacep: ViaCepClient,
    pub minhareceita: MinhaReceitaClient,
    pub webhook: WebhookClient,
    pub faturas: FaturasBridgeClient,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let http = build_client(config.http.timeout())?;
        let boletos_http = build_client(config.http.boletos_timeout())?;
        let urls = &config.providers;

        Ok(Self {
            brasilapi: BrasilApiClient::new(http.clone(), &urls.brasilapi_cep, &urls.brasilapi_cnpj),
            bigdata: BigDataClient::new(
                http.clone(),
                &urls.bigdata_pessoas,
                &urls.bigdata_empresas,
                config.bigdata.clone(),
            ),
            viacep: ViaCepClient::new(http.clone(), &urls.viacep),
            minhareceita: MinhaReceitaClient::new(http.clone(), &urls.minhareceita),
            webhook: WebhookClient::new(http.clone(), boletos_http, &urls.webhook),
            faturas: FaturasBridgeClient::new(http, &urls.faturas_bridge),
        })
    }
}
