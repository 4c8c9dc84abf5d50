//! Login, token refresh and password changes.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;
use common::models::{NivelAcesso, UsuarioResumo};
use common::token::{TokenService, TokenSubject, TokenType};

use crate::repository::{NovoUsuario, UsuarioRecord, UsuarioRepository};

/// Hashes a password as an Argon2id PHC string.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Falha ao gerar hash de senha: {e}")))
}

/// `false` for a mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "hash de senha ilegível");
            false
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "E-mail inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UsuarioResumo,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 8, message = "A nova senha deve ter pelo menos 8 caracteres."))]
    pub new_password: String,
}

#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse>;

    async fn refresh(&self, req: RefreshRequest) -> AppResult<AccessToken>;

    async fn me(&self, user: &AuthUser) -> AppResult<UsuarioResumo>;

    async fn change_password(&self, user: &AuthUser, req: ChangePasswordRequest) -> AppResult<()>;
}

pub struct AuthService {
    usuarios: Arc<dyn UsuarioRepository>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(usuarios: Arc<dyn UsuarioRepository>, tokens: TokenService) -> Self {
        Self { usuarios, tokens }
    }

    /// Creates the administrator account unless the e-mail already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        if self.usuarios.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "administrador já existe");
            return Ok(());
        }
        let criado = self
            .usuarios
            .create(NovoUsuario {
                email: email.clone(),
                nome_completo: "Administrador".into(),
                cpf: None,
                nivel_acesso: NivelAcesso::Admin,
                password_hash: hash_password(password)?,
            })
            .await?;
        tracing::info!(id = criado.id, email = %email, "administrador inicial criado");
        Ok(())
    }

    fn subject(usuario: &UsuarioRecord) -> TokenSubject {
        TokenSubject {
            user_id: usuario.id,
            email: usuario.email.clone(),
            nivel_acesso: usuario.nivel_acesso,
        }
    }
}

fn credenciais_invalidas() -> AppError {
    AppError::Unauthorized("Credenciais inválidas.".into())
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        req.validate()?;
        let email = req.email.trim().to_lowercase();
        let usuario = self
            .usuarios
            .find_by_email(&email)
            .await?
            .ok_or_else(credenciais_invalidas)?;

        if !usuario.is_active || !verify_password(&req.password, &usuario.password_hash) {
            tracing::warn!(email = %email, "login recusado");
            return Err(credenciais_invalidas());
        }

        let pair = self.tokens.issue_pair(&Self::subject(&usuario))?;
        tracing::info!(user_id = usuario.id, "login efetuado");
        Ok(LoginResponse {
            access: pair.access,
            refresh: pair.refresh,
            user: usuario.resumo(),
        })
    }

    async fn refresh(&self, req: RefreshRequest) -> AppResult<AccessToken> {
        let claims = self.tokens.decode(&req.refresh, TokenType::Refresh)?;
        let usuario = self
            .usuarios
            .find_by_id(claims.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Usuário inativo ou inexistente.".into()))?;
        let access = self.tokens.issue(&Self::subject(&usuario), TokenType::Access)?;
        Ok(AccessToken { access })
    }

    async fn me(&self, user: &AuthUser) -> AppResult<UsuarioResumo> {
        self.usuarios
            .find_by_id(user.user_id())
            .await?
            .map(|u| u.resumo())
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado.".into()))
    }

    async fn change_password(&self, user: &AuthUser, req: ChangePasswordRequest) -> AppResult<()> {
        req.validate()?;
        let usuario = self
            .usuarios
            .find_by_id(user.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado.".into()))?;
        if !verify_password(&req.old_password, &usuario.password_hash) {
            return Err(AppError::BadRequest("Senha antiga incorreta.".into()));
        }
        let hash = hash_password(&req.new_password)?;
        self.usuarios.update_password(usuario.id, &hash).await?;
        tracing::info!(user_id = usuario.id, "senha alterada");
        Ok(())
    }
}
