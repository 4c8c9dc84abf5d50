//! Insured lists, invoices, administrators and payment slips.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado, TipoConsulta};
use common::utils::http::query_pairs;

use crate::providers::webhook::Ramo;
use crate::providers::{FaturasBridgeClient, WebhookClient};
use crate::repository::HistoricoRepository;

use super::{registrar, Registro};

const SEGURADOS_PAGE: u32 = 1;
const SEGURADOS_PAGE_SIZE: u32 = 50;
pub const ADMINISTRADORAS_PAGE_SIZE: u32 = 5;

/// `GET /api/consultas/fatura/fatura-dinamica` filters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FiltroFaturas {
    pub fatura: Option<String>,
    pub apolice: Option<String>,
    pub administradora: Option<String>,
    pub seguradora: Option<String>,
    pub status: Option<String>,
    pub ramo: Option<String>,
    pub data_ini: Option<String>,
    pub data_fim: Option<String>,
    pub valor_min: Option<String>,
    pub valor_max: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FiltroFaturas {
    /// Non-empty filters as query pairs; `limit` defaults to 100, `offset` to 0.
    pub fn query(&self) -> Vec<(String, String)> {
        let texto = [
            ("fatura", &self.fatura),
            ("apolice", &self.apolice),
            ("administradora", &self.administradora),
            ("seguradora", &self.seguradora),
            ("status", &self.status),
            ("ramo", &self.ramo),
            ("data_ini", &self.data_ini),
            ("data_fim", &self.data_fim),
            ("valor_min", &self.valor_min),
            ("valor_max", &self.valor_max),
        ];
        let mut pares: Vec<(String, String)> = texto
            .into_iter()
            .filter_map(|(k, v)| {
                v.as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty() && *v != "null")
                    .map(|v| (k.to_string(), v.to_string()))
            })
            .collect();
        pares.push(("limit".into(), self.limit.unwrap_or(100).to_string()));
        pares.push(("offset".into(), self.offset.unwrap_or(0).to_string()));
        pares
    }
}

pub struct SegurosService {
    webhook: WebhookClient,
    faturas: FaturasBridgeClient,
    historico: Arc<dyn HistoricoRepository>,
}

impl SegurosService {
    pub fn new(
        webhook: WebhookClient,
        faturas: FaturasBridgeClient,
        historico: Arc<dyn HistoricoRepository>,
    ) -> Self {
        Self {
            webhook,
            faturas,
            historico,
        }
    }

    /// Life or fire insured list, paginated upstream.
    pub async fn segurados(
        &self,
        user: &AuthUser,
        req: ConsultaRequest,
    ) -> AppResult<ConsultaResultado> {
        let ramo = match req.tipo_consulta.as_str() {
            "vida" => Ramo::Vida,
            "incendio" => Ramo::Incendio,
            _ => {
                return Err(AppError::BadRequest(
                    "Tipo de consulta não suportado por esta rota. Use 'vida' ou 'incendio'."
                        .into(),
                ))
            }
        };
        let params = req.parametro_json()?;
        let parametro = Value::Object(params.clone()).to_string();

        let mut query = params;
        query
            .entry("page")
            .or_insert_with(|| Value::from(SEGURADOS_PAGE));
        query
            .entry("page_size")
            .or_insert_with(|| Value::from(SEGURADOS_PAGE_SIZE));
        let resultado = self.webhook.segurados(ramo, &query_pairs(&query)).await?;

        registrar(
            self.historico.as_ref(),
            user,
            Registro {
                tipo_consulta: &req.tipo_consulta,
                parametro,
                origem: req.origem(),
                lote_id: req.lote_id,
                resultado,
                mensagem: super::consulta::MENSAGEM_SUCESSO,
            },
        )
        .await
    }

    pub async fn faturas(
        &self,
        user: &AuthUser,
        req: ConsultaRequest,
    ) -> AppResult<ConsultaResultado> {
        let params = req.parametro_json()?;
        let resultado = self.webhook.faturas(&query_pairs(&params)).await?;

        registrar(
            self.historico.as_ref(),
            user,
            Registro {
                tipo_consulta: TipoConsulta::Faturas.as_str(),
                parametro: Value::Object(params).to_string(),
                origem: req.origem(),
                lote_id: req.lote_id,
                resultado,
                mensagem: "Consulta de faturas realizada com sucesso.",
            },
        )
        .await
    }

    /// Autocomplete; a blank term short-circuits to an empty list.
    pub async fn administradoras(&self, termo: Option<&str>, page_size: Option<u32>) -> AppResult<Value> {
        match termo.map(str::trim).filter(|t| !t.is_empty()) {
            Some(termo) => {
                self.webhook
                    .administradoras(termo, page_size.unwrap_or(ADMINISTRADORAS_PAGE_SIZE))
                    .await
            }
            None => Ok(Value::Array(Vec::new())),
        }
    }

    pub async fn boletos(&self, numero: Option<&str>) -> AppResult<Value> {
        let numero = numero
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("Parâmetro numero é obrigatório".into()))?;
        self.webhook.boletos(numero).await
    }

    pub async fn fatura(&self, numero: &str) -> AppResult<Value> {
        self.faturas.fatura(numero.trim()).await
    }

    pub async fn fatura_dinamica(&self, filtro: &FiltroFaturas) -> AppResult<Value> {
        let query = filtro.query();
        tracing::info!(filtros = ?query, "busca dinâmica de faturas");
        self.faturas.fatura_dinamica(&query).await
    }
}
