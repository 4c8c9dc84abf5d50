//! Route table.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use common::middleware::require_auth;

use crate::handlers::{agenda, auth, comercial, consultas, cotacao, health, seguros};
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh));

    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users/me", get(auth::me))
        .route("/api/users/password", post(auth::change_password))
        .route("/api/consultas/realizar", post(consultas::realizar))
        .route("/api/consultas/historico", get(consultas::historico))
        .route("/api/consultas/historico/{id}", get(consultas::historico_detalhe))
        .route(
            "/api/consultas/historico/usuario/{user_id}",
            get(consultas::historico_usuario),
        )
        .route("/api/consultas/comercial", post(comercial::consultar_cnpj))
        .route("/api/consultas/cont-comercial", post(comercial::consultar_contato))
        .route("/api/consultas/comercial-regiao", post(comercial::empresas_regiao))
        .route("/api/consultas/segurados", post(seguros::segurados))
        .route("/api/consultas/faturas", post(seguros::faturas))
        .route("/api/consultas/fatura/fatura-dinamica", get(seguros::fatura_dinamica))
        .route("/api/consultas/fatura/{numero}", get(seguros::fatura))
        .route("/api/administradoras", get(seguros::administradoras))
        .route("/api/boletos", get(seguros::boletos))
        .route("/api/cotacao/incendio-conteudo", post(cotacao::incendio_conteudo))
        .route(
            "/api/comercial/agenda",
            get(agenda::list_agendamentos).post(agenda::create_agendamento),
        )
        .route(
            "/api/comercial/agenda/{id}",
            get(agenda::get_agendamento)
                .put(agenda::update_agendamento)
                .delete(agenda::delete_agendamento),
        )
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_auth,
        ));

    public.merge(protected)
}
