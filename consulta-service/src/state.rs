//! Application state for consulta service.

use common::config::AppConfig;
use common::errors::AppResult;
use common::token::TokenService;

use crate::providers::Providers;
use crate::repository::Stores;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenService,
    pub providers: Providers,
    pub stores: Stores,
}

impl AppState {
    /// Builds the outbound clients from `config` around the given stores.
    pub fn new(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let tokens = TokenService::new(&config.jwt);
        let providers = Providers::from_config(&config)?;
        Ok(Self {
            config,
            tokens,
            providers,
            stores,
        })
    }
}
