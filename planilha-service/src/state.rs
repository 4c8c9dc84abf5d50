//! Application state for planilha service.

use common::config::AppConfig;
use common::errors::AppResult;
use common::token::TokenService;
use common::utils::http::build_client;

use crate::client::ConsultaClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenService,
    pub consulta: ConsultaClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let http = build_client(config.http.bulk_timeout())?;
        let consulta = ConsultaClient::new(http, &config.services.consulta_service);
        Ok(Self {
            tokens: TokenService::new(&config.jwt),
            consulta,
            config,
        })
    }
}
