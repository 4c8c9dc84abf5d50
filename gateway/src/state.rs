//! Application state for the gateway.

use common::config::{AppConfig, ServiceUrls};
use common::utils::http::build_client;
use common::AppResult;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service_urls: ServiceUrls,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Proxied calls may carry a spreadsheet run, so the client uses the bulk timeout.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let http_client = build_client(config.http.bulk_timeout())?;

        Ok(Self {
            service_urls: config.services.clone(),
            config,
            http_client,
        })
    }
}
