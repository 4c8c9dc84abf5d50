//! Middleware components for all services.

pub mod auth;
pub mod request_id;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

pub use auth::{extract_bearer_token, require_auth, AuthUser};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

/// CORS layer for the configured origins; `*` (or an empty list) allows any.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}
