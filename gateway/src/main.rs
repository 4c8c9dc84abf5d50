use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use common::config::AppConfig;
use common::telemetry::init_tracing;
use gateway::{create_router, AppState};

const SERVICE_NAME: &str = "gateway";
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut config =
        AppConfig::load_with_service(SERVICE_NAME).context("configuração inválida")?;
    config.port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let state = AppState::new(config.clone())?;
    info!(
        consulta_service = %config.services.consulta_service,
        planilha_service = %config.services.planilha_service,
        "upstream services configured"
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "starting gateway");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("falha ao escutar em {addr}"))?;
    axum::serve(listener, app).await.context("servidor encerrado com erro")?;
    Ok(())
}
