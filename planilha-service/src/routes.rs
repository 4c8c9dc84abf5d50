//! Route table.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use common::middleware::require_auth;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/planilhas/modelo/{tipo}", get(handlers::baixar_modelo));

    let protected = Router::new()
        .route("/api/planilhas/processar/{tipo}", post(handlers::processar))
        .route(
            "/api/planilhas/consulta-massa-comercial",
            post(handlers::consulta_massa),
        )
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_auth,
        ));

    public.merge(protected)
}
