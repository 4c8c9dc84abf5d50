//! PostgreSQL implementation of the repositories.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use common::config::DatabaseConfig;
use common::errors::{AppError, AppResult};
use common::models::consulta::tipo_display;
use common::models::{HistoricoItem, NivelAcesso, OrigemConsulta};

use super::{
    Agendamento, AgendamentoRepository, CotacaoRepository, DadosAgendamento, HistoricoRepository,
    NovaCotacao, NovoHistorico, NovoUsuario, Responsavel, UsuarioRecord, UsuarioRepository,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS usuarios (
        id               BIGSERIAL    PRIMARY KEY,
        email            VARCHAR(254) NOT NULL UNIQUE,
        nome_completo    VARCHAR(255) NOT NULL DEFAULT '',
        cpf              VARCHAR(14),
        nivel_acesso     VARCHAR(20)  NOT NULL DEFAULT 'usuario',
        password_hash    TEXT         NOT NULL,
        is_active        BOOLEAN      NOT NULL DEFAULT TRUE,
        is_fed           BOOLEAN      NOT NULL DEFAULT FALSE,
        data_criacao     TIMESTAMPTZ  NOT NULL DEFAULT now(),
        data_atualizacao TIMESTAMPTZ  NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS historico_consultas (
        id                 BIGSERIAL   PRIMARY KEY,
        usuario_id         BIGINT      REFERENCES usuarios(id) ON DELETE SET NULL,
        tipo_consulta      VARCHAR(50) NOT NULL,
        parametro_consulta TEXT        NOT NULL,
        origem             VARCHAR(20) NOT NULL DEFAULT 'manual',
        data_consulta      TIMESTAMPTZ NOT NULL DEFAULT now(),
        resultado          JSONB,
        lote_id            UUID
    )",
    "CREATE INDEX IF NOT EXISTS idx_historico_usuario_data
        ON historico_consultas (usuario_id, data_consulta DESC)",
    "CREATE INDEX IF NOT EXISTS idx_historico_lote ON historico_consultas (lote_id)",
    "CREATE TABLE IF NOT EXISTS cotacoes_incendio (
        id             BIGSERIAL   PRIMARY KEY,
        responsavel_id BIGINT      NOT NULL REFERENCES usuarios(id) ON DELETE CASCADE,
        entrada        JSONB       NOT NULL,
        resultado      JSONB       NOT NULL,
        data_cotacao   TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS agenda_comercial (
        id                  BIGSERIAL    PRIMARY KEY,
        empresa             VARCHAR(255) NOT NULL,
        data                DATE         NOT NULL,
        responsavel_id      BIGINT       REFERENCES usuarios(id) ON DELETE SET NULL,
        status              VARCHAR(50)  NOT NULL DEFAULT 'Pendente',
        hora                TIME,
        obs                 TEXT,
        motivo_cancelamento TEXT
    )",
];

/// Repositories on a shared connection pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::Database(format!("falha ao conectar no banco: {e}")))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Creates missing tables and indexes.
    pub async fn ensure_schema(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("falha ao criar esquema: {e}")))?;
        }
        tracing::info!("database schema ensured");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UsuarioRow {
    id: i64,
    email: String,
    nome_completo: String,
    cpf: Option<String>,
    nivel_acesso: String,
    password_hash: String,
    is_active: bool,
    is_fed: bool,
    data_criacao: DateTime<Utc>,
}

impl From<UsuarioRow> for UsuarioRecord {
    fn from(row: UsuarioRow) -> Self {
        Self {
            nivel_acesso: row.nivel_acesso.parse().unwrap_or(NivelAcesso::Usuario),
            id: row.id,
            email: row.email,
            nome_completo: row.nome_completo,
            cpf: row.cpf,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_fed: row.is_fed,
            data_criacao: row.data_criacao,
        }
    }
}

const USUARIO_COLUMNS: &str =
    "id, email, nome_completo, cpf, nivel_acesso, password_hash, is_active, is_fed, data_criacao";

#[async_trait]
impl UsuarioRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UsuarioRecord>> {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UsuarioRecord::from))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<UsuarioRecord>> {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UsuarioRecord::from))
    }

    async fn create(&self, novo: NovoUsuario) -> AppResult<UsuarioRecord> {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            "INSERT INTO usuarios (email, nome_completo, cpf, nivel_acesso, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USUARIO_COLUMNS}"
        ))
        .bind(&novo.email)
        .bind(&novo.nome_completo)
        .bind(&novo.cpf)
        .bind(novo.nivel_acesso.as_str())
        .bind(&novo.password_hash)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = row.id, email = %row.email, "usuário criado");
        Ok(row.into())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE usuarios SET password_hash = $1, data_atualizacao = now() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usuário não encontrado.".into()));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct HistoricoRow {
    id: i64,
    usuario_id: Option<i64>,
    usuario_email: Option<String>,
    tipo_consulta: String,
    parametro_consulta: String,
    origem: String,
    data_consulta: DateTime<Utc>,
    resultado: Option<Value>,
    lote_id: Option<Uuid>,
}

impl From<HistoricoRow> for HistoricoItem {
    fn from(row: HistoricoRow) -> Self {
        Self {
            tipo_consulta_display: tipo_display(&row.tipo_consulta),
            id: row.id,
            usuario: row.usuario_id,
            usuario_email: row.usuario_email,
            tipo_consulta: row.tipo_consulta,
            origem: OrigemConsulta::from_db(&row.origem),
            parametro_consulta: row.parametro_consulta,
            data_consulta: row.data_consulta,
            resultado: row.resultado,
            lote_id: row.lote_id,
        }
    }
}

const HISTORICO_SELECT: &str = "SELECT h.id, h.usuario_id, u.email AS usuario_email, h.tipo_consulta,
        h.parametro_consulta, h.origem, h.data_consulta, h.resultado, h.lote_id
     FROM historico_consultas h
     LEFT JOIN usuarios u ON u.id = h.usuario_id";

#[async_trait]
impl HistoricoRepository for PgStore {
    async fn insert(&self, novo: NovoHistorico) -> AppResult<HistoricoItem> {
        let (id, data_consulta): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO historico_consultas
                (usuario_id, tipo_consulta, parametro_consulta, origem, resultado, lote_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, data_consulta",
        )
        .bind(novo.usuario)
        .bind(&novo.tipo_consulta)
        .bind(&novo.parametro_consulta)
        .bind(novo.origem.as_str())
        .bind(&novo.resultado)
        .bind(novo.lote_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id, tipo = %novo.tipo_consulta, "histórico salvo");
        Ok(HistoricoItem {
            id,
            usuario: novo.usuario,
            usuario_email: novo.usuario_email,
            tipo_consulta_display: tipo_display(&novo.tipo_consulta),
            tipo_consulta: novo.tipo_consulta,
            origem: novo.origem,
            parametro_consulta: novo.parametro_consulta,
            data_consulta,
            resultado: novo.resultado,
            lote_id: novo.lote_id,
        })
    }

    async fn list(
        &self,
        usuario: Option<i64>,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<HistoricoItem>, u64)> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let rows = sqlx::query_as::<_, HistoricoRow>(&format!(
            "{HISTORICO_SELECT}
             WHERE ($1::BIGINT IS NULL OR h.usuario_id = $1)
             ORDER BY h.data_consulta DESC, h.id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(usuario)
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM historico_consultas WHERE ($1::BIGINT IS NULL OR usuario_id = $1)",
        )
        .bind(usuario)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(HistoricoItem::from).collect(), total.max(0) as u64))
    }

    async fn get(&self, id: i64) -> AppResult<Option<HistoricoItem>> {
        let row = sqlx::query_as::<_, HistoricoRow>(&format!("{HISTORICO_SELECT} WHERE h.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(HistoricoItem::from))
    }
}

#[async_trait]
impl CotacaoRepository for PgStore {
    async fn insert(&self, nova: NovaCotacao) -> AppResult<(i64, DateTime<Utc>)> {
        let row: (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO cotacoes_incendio (responsavel_id, entrada, resultado)
             VALUES ($1, $2, $3)
             RETURNING id, data_cotacao",
        )
        .bind(nova.responsavel)
        .bind(&nova.entrada)
        .bind(&nova.resultado)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[derive(sqlx::FromRow)]
struct AgendamentoRow {
    id: i64,
    empresa: String,
    data: NaiveDate,
    status: String,
    hora: Option<NaiveTime>,
    obs: Option<String>,
    motivo_cancelamento: Option<String>,
    responsavel_id: Option<i64>,
    responsavel_email: Option<String>,
    responsavel_nome: Option<String>,
}

impl From<AgendamentoRow> for Agendamento {
    fn from(row: AgendamentoRow) -> Self {
        let responsavel = match (row.responsavel_id, row.responsavel_email) {
            (Some(id), Some(email)) => Some(Responsavel {
                id,
                email,
                nome_completo: row.responsavel_nome.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            id: row.id,
            empresa: row.empresa,
            data: row.data,
            responsavel,
            status: row.status,
            hora: row.hora,
            obs: row.obs,
            motivo_cancelamento: row.motivo_cancelamento,
        }
    }
}

const AGENDA_SELECT: &str = "SELECT a.id, a.empresa, a.data, a.status, a.hora, a.obs,
        a.motivo_cancelamento, a.responsavel_id,
        u.email AS responsavel_email, u.nome_completo AS responsavel_nome
     FROM agenda_comercial a
     LEFT JOIN usuarios u ON u.id = a.responsavel_id";

#[async_trait]
impl AgendamentoRepository for PgStore {
    async fn list(&self) -> AppResult<Vec<Agendamento>> {
        let rows = sqlx::query_as::<_, AgendamentoRow>(&format!(
            "{AGENDA_SELECT} ORDER BY a.data DESC, a.hora DESC NULLS LAST, a.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Agendamento::from).collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Agendamento>> {
        let row = sqlx::query_as::<_, AgendamentoRow>(&format!("{AGENDA_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Agendamento::from))
    }

    async fn create(&self, responsavel: i64, dados: DadosAgendamento) -> AppResult<Agendamento> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO agenda_comercial
                (empresa, data, responsavel_id, status, hora, obs, motivo_cancelamento)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&dados.empresa)
        .bind(dados.data)
        .bind(responsavel)
        .bind(&dados.status)
        .bind(dados.hora)
        .bind(&dados.obs)
        .bind(&dados.motivo_cancelamento)
        .fetch_one(&self.pool)
        .await?;

        AgendamentoRepository::get(self, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("agendamento {id} sumiu após inserção")))
    }

    async fn update(&self, id: i64, dados: DadosAgendamento) -> AppResult<Option<Agendamento>> {
        let result = sqlx::query(
            "UPDATE agenda_comercial
             SET empresa = $1, data = $2, status = $3, hora = $4, obs = $5, motivo_cancelamento = $6
             WHERE id = $7",
        )
        .bind(&dados.empresa)
        .bind(dados.data)
        .bind(&dados.status)
        .bind(dados.hora)
        .bind(&dados.obs)
        .bind(&dados.motivo_cancelamento)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        AgendamentoRepository::get(self, id).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM agenda_comercial WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
