//! Commercial visit scheduling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;

use crate::repository::{Agendamento, AgendamentoRepository, DadosAgendamento};

pub const STATUS_PADRAO: &str = "Pendente";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AgendamentoPayload {
    #[validate(length(min = 1, max = 255, message = "Empresa é obrigatória."))]
    pub empresa: String,
    pub data: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub hora: Option<NaiveTime>,
    #[serde(default)]
    pub obs: Option<String>,
    #[serde(default)]
    pub motivo_cancelamento: Option<String>,
}

impl AgendamentoPayload {
    fn into_dados(self) -> DadosAgendamento {
        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| STATUS_PADRAO.to_string());
        DadosAgendamento {
            empresa: self.empresa.trim().to_string(),
            data: self.data,
            status,
            hora: self.hora,
            obs: self.obs,
            motivo_cancelamento: self.motivo_cancelamento,
        }
    }
}

#[async_trait]
pub trait AgendaServiceTrait: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Agendamento>>;

    async fn get(&self, id: i64) -> AppResult<Agendamento>;

    /// The caller becomes the visit's `responsavel`.
    async fn create(&self, user: &AuthUser, payload: AgendamentoPayload) -> AppResult<Agendamento>;

    async fn update(&self, id: i64, payload: AgendamentoPayload) -> AppResult<Agendamento>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub struct AgendaService {
    agenda: Arc<dyn AgendamentoRepository>,
}

impl AgendaService {
    pub fn new(agenda: Arc<dyn AgendamentoRepository>) -> Self {
        Self { agenda }
    }
}

fn nao_encontrado() -> AppError {
    AppError::NotFound("Agendamento não encontrado.".into())
}

#[async_trait]
impl AgendaServiceTrait for AgendaService {
    async fn list(&self) -> AppResult<Vec<Agendamento>> {
        self.agenda.list().await
    }

    async fn get(&self, id: i64) -> AppResult<Agendamento> {
        self.agenda.get(id).await?.ok_or_else(nao_encontrado)
    }

    async fn create(&self, user: &AuthUser, payload: AgendamentoPayload) -> AppResult<Agendamento> {
        payload.validate()?;
        let agendamento = self.agenda.create(user.user_id(), payload.into_dados()).await?;
        tracing::info!(id = agendamento.id, empresa = %agendamento.empresa, "agendamento criado");
        Ok(agendamento)
    }

    async fn update(&self, id: i64, payload: AgendamentoPayload) -> AppResult<Agendamento> {
        payload.validate()?;
        self.agenda
            .update(id, payload.into_dados())
            .await?
            .ok_or_else(nao_encontrado)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        if self.agenda.delete(id).await? {
            tracing::info!(id, "agendamento removido");
            Ok(())
        } else {
            Err(nao_encontrado())
        }
    }
}
