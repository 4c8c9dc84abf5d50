use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use common::config::AppConfig;
use common::telemetry::init_tracing;
use consulta_service::repository::{PgStore, Stores};
use consulta_service::service::AuthService;
use consulta_service::{create_router, AppState};

const SERVICE_NAME: &str = "consulta-service";
const DEFAULT_PORT: u16 = 8081;

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

    let store = PgStore::connect(&config.database)
        .await
        .context("falha ao conectar ao banco de dados")?;
    let state = AppState::new(config.clone(), Stores::postgres(store))?;

    if let (Ok(email), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) {
        AuthService::new(state.stores.usuarios.clone(), state.tokens.clone())
            .ensure_admin(&email, &password)
            .await?;
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "starting service");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("falha ao escutar em {addr}"))?;
    axum::serve(listener, app).await.context("servidor encerrado com erro")?;
    Ok(())
}
