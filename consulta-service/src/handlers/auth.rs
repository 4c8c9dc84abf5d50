//! Login and account handlers.

use axum::{extract::State, Json};

use common::errors::AppError;
use common::middleware::AuthUser;
use common::models::UsuarioResumo;
use common::response::{ApiResponse, MessageData};

use crate::service::auth::{
    AccessToken, ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest,
};
use crate::service::{AuthService, AuthServiceTrait};
use crate::state::AppState;

use super::SERVICE;

fn service(state: &AppState) -> AuthService {
    AuthService::new(state.stores.usuarios.clone(), state.tokens.clone())
}

/// Exchange credentials for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens emitidos", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let data = service(&state).login(req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// New access token from a refresh token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token renovado", body = ApiResponse<AccessToken>),
        (status = 401, description = "Refresh token inválido ou expirado")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AccessToken>>, AppError> {
    let data = service(&state).refresh(req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Tokens are stateless; the client discards them
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout", body = ApiResponse<MessageData>)
    ),
    security(("bearer" = []))
)]
pub async fn logout(user: AuthUser) -> Json<ApiResponse<MessageData>> {
    tracing::info!(user_id = user.user_id(), "logout");
    Json(ApiResponse::ok_with_service(
        MessageData::new("Logout realizado com sucesso."),
        SERVICE,
    ))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = ApiResponse<UsuarioResumo>)
    ),
    security(("bearer" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UsuarioResumo>>, AppError> {
    let data = service(&state).me(&user).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE)))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/api/users/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Senha alterada", body = ApiResponse<MessageData>),
        (status = 400, description = "Senha antiga incorreta ou nova senha inválida")
    ),
    security(("bearer" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageData>>, AppError> {
    service(&state).change_password(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(
        MessageData::new("Senha alterada com sucesso."),
        SERVICE,
    )))
}
