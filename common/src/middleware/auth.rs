//! Bearer-token authentication.
//!
//! `require_auth` validates the access token and stores an [`AuthUser`] in the
//! request extensions; handlers take `AuthUser` as an extractor.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, AppResult};
use crate::models::NivelAcesso;
use crate::token::{Claims, TokenService, TokenType};

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    /// Raw access token, forwarded on service-to-service calls.
    pub token: String,
}

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.claims.user_id
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn nivel(&self) -> NivelAcesso {
        self.claims.nivel_acesso
    }

    pub fn is_admin(&self) -> bool {
        self.claims.nivel_acesso == NivelAcesso::Admin
    }

    /// Fails with 403 unless the caller has one of `niveis`.
    pub fn require_any(&self, niveis: &[NivelAcesso]) -> AppResult<()> {
        if niveis.contains(&self.claims.nivel_acesso) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Este usuário não possui nível de acesso para esta consulta.".into(),
            ))
        }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a valid access token.
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(req.headers())
        .ok_or_else(|| {
            AppError::Unauthorized("As credenciais de autenticação não foram fornecidas.".into())
        })?
        .to_string();

    let claims = tokens.decode(&token, TokenType::Access)?;
    tracing::debug!(user_id = claims.user_id, nivel = %claims.nivel_acesso, "authenticated");
    req.extensions_mut().insert(AuthUser { claims, token });

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Autenticação necessária.".into()))
    }
}
