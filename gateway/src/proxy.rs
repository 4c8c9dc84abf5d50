//! Reverse proxy to the backing services.
//!
//! `/api/planilhas/**` goes to planilha-service and every other `/api/**`
//! path to consulta-service. Method, query, body and end-to-end headers are
//! forwarded unchanged; authentication stays with the services.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use tracing::{debug, warn};

use common::config::ServiceUrls;
use common::middleware::{RequestId, REQUEST_ID_HEADER};
use common::utils::http::join_url;
use common::{AppError, AppResult};

use crate::state::AppState;

/// Largest request body accepted for forwarding.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Connection-scoped headers, plus the ones the client recomputes.
const HOP_BY_HOP: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Picks the upstream base URL for a path, `None` outside `/api`.
pub fn upstream_for<'a>(urls: &'a ServiceUrls, path: &str) -> Option<&'a str> {
    if under(path, "/api/planilhas") {
        Some(urls.planilha_service.as_str())
    } else if under(path, "/api") {
        Some(urls.consulta_service.as_str())
    } else {
        None
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Copies `headers` without hop-by-hop entries or the ones named in `Connection`.
pub fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if HOP_BY_HOP.contains(&name.as_str()) || listed.iter().any(|l| l == name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

fn bad_gateway(message: String) -> AppError {
    AppError::Upstream {
        status: 502,
        message,
        details: None,
    }
}

/// Fallback handler forwarding the request to its service.
pub async fn forward(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();
    let base = upstream_for(&state.service_urls, path)
        .ok_or_else(|| AppError::NotFound("Rota não encontrada.".to_string()))?;

    let mut url = join_url(base, path);
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Corpo da requisição inválido: {e}")))?;

    let mut headers = end_to_end(&parts.headers);
    if let Some(id) = parts.extensions.get::<RequestId>() {
        if let Ok(value) = HeaderValue::from_str(id.as_str()) {
            headers.insert(REQUEST_ID_HEADER.clone(), value);
        }
    }

    debug!(method = %parts.method, upstream = %url, "forwarding request");
    let upstream = state
        .http_client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(upstream = %url, error = %e, "upstream unreachable");
            bad_gateway(format!("Serviço indisponível: {e}"))
        })?;

    let status = upstream.status();
    let headers = end_to_end(upstream.headers());
    let bytes = upstream.bytes().await.map_err(|e| {
        warn!(upstream = %url, error = %e, "upstream body failed");
        bad_gateway(format!("Resposta incompleta do serviço: {e}"))
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
