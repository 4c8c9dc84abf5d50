//! Persistence seams.
//!
//! Services depend on the traits below; `PgStore` implements all of them on
//! PostgreSQL and tests plug in-memory implementations.

mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use common::errors::AppResult;
use common::models::{HistoricoItem, NivelAcesso, OrigemConsulta, UsuarioResumo};

pub use postgres::PgStore;

/// Stored user, including the password hash.
#[derive(Debug, Clone)]
pub struct UsuarioRecord {
    pub id: i64,
    pub email: String,
    pub nome_completo: String,
    pub cpf: Option<String>,
    pub nivel_acesso: NivelAcesso,
    pub password_hash: String,
    pub is_active: bool,
    pub is_fed: bool,
    pub data_criacao: DateTime<Utc>,
}

impl UsuarioRecord {
    pub fn resumo(&self) -> UsuarioResumo {
        UsuarioResumo {
            id: self.id,
            email: self.email.clone(),
            nome_completo: self.nome_completo.clone(),
            cpf: self.cpf.clone(),
            nivel_acesso: self.nivel_acesso,
            is_active: self.is_active,
            is_fed: self.is_fed,
            data_criacao: self.data_criacao,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NovoUsuario {
    pub email: String,
    pub nome_completo: String,
    pub cpf: Option<String>,
    pub nivel_acesso: NivelAcesso,
    pub password_hash: String,
}

/// History row to insert.
#[derive(Debug, Clone)]
pub struct NovoHistorico {
    pub usuario: Option<i64>,
    pub usuario_email: Option<String>,
    pub tipo_consulta: String,
    pub parametro_consulta: String,
    pub origem: OrigemConsulta,
    pub resultado: Option<Value>,
    pub lote_id: Option<Uuid>,
}

/// Quote inputs and outputs to persist.
#[derive(Debug, Clone)]
pub struct NovaCotacao {
    pub responsavel: i64,
    pub entrada: Value,
    pub resultado: Value,
}

/// Commercial visit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Agendamento {
    pub id: i64,
    pub empresa: String,
    pub data: NaiveDate,
    pub responsavel: Option<Responsavel>,
    pub status: String,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub hora: Option<NaiveTime>,
    pub obs: Option<String>,
    pub motivo_cancelamento: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Responsavel {
    pub id: i64,
    pub email: String,
    pub nome_completo: String,
}

/// Writable fields of a visit.
#[derive(Debug, Clone)]
pub struct DadosAgendamento {
    pub empresa: String,
    pub data: NaiveDate,
    pub status: String,
    pub hora: Option<NaiveTime>,
    pub obs: Option<String>,
    pub motivo_cancelamento: Option<String>,
}

#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UsuarioRecord>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<UsuarioRecord>>;

    async fn create(&self, novo: NovoUsuario) -> AppResult<UsuarioRecord>;

    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()>;
}

#[async_trait]
pub trait HistoricoRepository: Send + Sync {
    async fn insert(&self, novo: NovoHistorico) -> AppResult<HistoricoItem>;

    /// Newest first. `usuario = None` lists every user's rows.
    async fn list(
        &self,
        usuario: Option<i64>,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<HistoricoItem>, u64)>;

    async fn get(&self, id: i64) -> AppResult<Option<HistoricoItem>>;
}

#[async_trait]
pub trait CotacaoRepository: Send + Sync {
    /// Returns the new id and its timestamp.
    async fn insert(&self, nova: NovaCotacao) -> AppResult<(i64, DateTime<Utc>)>;
}

#[async_trait]
pub trait AgendamentoRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Agendamento>>;

    async fn get(&self, id: i64) -> AppResult<Option<Agendamento>>;

    async fn create(&self, responsavel: i64, dados: DadosAgendamento) -> AppResult<Agendamento>;

    async fn update(&self, id: i64, dados: DadosAgendamento) -> AppResult<Option<Agendamento>>;

    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Repository handles held by the application state.
#[derive(Clone)]
pub struct Stores {
    pub usuarios: Arc<dyn UsuarioRepository>,
    pub historico: Arc<dyn HistoricoRepository>,
    pub cotacoes: Arc<dyn CotacaoRepository>,
    pub agenda: Arc<dyn AgendamentoRepository>,
}

impl Stores {
    /// All repositories backed by one PostgreSQL store.
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            usuarios: store.clone(),
            historico: store.clone(),
            cotacoes: store.clone(),
            agenda: store,
        }
    }
}
