//! Lookup service
//!
//! - CPF / CNPJ / CEP lookups against BrasilAPI, BigDataCorp and ViaCEP
//! - lookup history
//! - commercial prospecting (relationships, contacts, companies by region)
//! - insured lists, invoices and payment slips
//! - fire-insurance quotes and commercial visit scheduling
//! - login and JWT issuing

pub mod handlers;
pub mod providers;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use axum::{middleware, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use common::middleware::{cors_layer, request_id_middleware};

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consulta Service API",
        version = "0.1.0",
        description = "Consultas cadastrais, histórico, seguros, cotação e agenda comercial"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::auth::change_password,
        handlers::consultas::realizar,
        handlers::consultas::historico,
        handlers::consultas::historico_detalhe,
        handlers::consultas::historico_usuario,
        handlers::comercial::consultar_cnpj,
        handlers::comercial::consultar_contato,
        handlers::comercial::empresas_regiao,
        handlers::seguros::segurados,
        handlers::seguros::faturas,
        handlers::seguros::administradoras,
        handlers::seguros::boletos,
        handlers::seguros::fatura,
        handlers::seguros::fatura_dinamica,
        handlers::cotacao::incendio_conteudo,
        handlers::agenda::list_agendamentos,
        handlers::agenda::create_agendamento,
        handlers::agenda::get_agendamento,
        handlers::agenda::update_agendamento,
        handlers::agenda::delete_agendamento,
    ),
    components(schemas(
        common::models::ConsultaRequest,
        common::models::ConsultaResultado,
        common::models::HistoricoItem,
        common::models::OrigemConsulta,
        common::models::NivelAcesso,
        common::models::UsuarioResumo,
        common::response::MessageData,
        service::auth::LoginRequest,
        service::auth::LoginResponse,
        service::auth::RefreshRequest,
        service::auth::AccessToken,
        service::auth::ChangePasswordRequest,
        service::comercial::FiltroRegiao,
        service::comercial::EmpresaRegiao,
        service::cotacao::CotacaoEntrada,
        service::cotacao::CotacaoResultado,
        service::agenda::AgendamentoPayload,
        repository::Agendamento,
        repository::Responsavel,
        handlers::health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Autenticação"),
        (name = "consultas", description = "Consultas cadastrais e histórico"),
        (name = "comercial", description = "Prospecção comercial"),
        (name = "seguros", description = "Segurados, faturas e boletos"),
        (name = "cotacao", description = "Cotação de seguro incêndio"),
        (name = "agenda", description = "Agenda comercial"),
        (name = "health", description = "Health check")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(routes::router(&state))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
