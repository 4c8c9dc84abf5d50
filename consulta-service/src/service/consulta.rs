//! Registry lookups and lookup history.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado, HistoricoItem, PageParams, TipoConsulta};
use common::response::PaginatedData;
use common::utils::{normalize_cep, normalize_cnpj, normalize_cpf, only_digits, validate_uf};

use crate::providers::bigdatacorp::{basic_data_payload, first_tax_id};
use crate::providers::Providers;
use crate::repository::HistoricoRepository;

use super::{registrar, Registro};

pub const MENSAGEM_SUCESSO: &str = "Consulta realizada com sucesso.";

const HISTORICO_PAGE_SIZE: u32 = 10;
const HISTORICO_MAX_PAGE_SIZE: u32 = 100;

/// A lookup whose parameter has been checked and normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsultaValidada {
    Endereco { cep: String },
    Cpf { cpf: String },
    Cnpj { cnpj: String },
    CpfAlternativa { payload: Value },
    CnpjRazaoSocial { payload: Value },
    CepRuaCidade {
        uf: String,
        cidade: String,
        logradouro: String,
    },
}

impl ConsultaValidada {
    pub fn from_request(req: &ConsultaRequest) -> AppResult<Self> {
        let tipo = req.tipo()?;
        match tipo {
            TipoConsulta::Endereco => Ok(Self::Endereco {
                cep: normalize_cep(&req.parametro_texto())?,
            }),
            TipoConsulta::Cpf => Ok(Self::Cpf {
                cpf: normalize_cpf(&req.parametro_texto())?,
            }),
            TipoConsulta::Cnpj => Ok(Self::Cnpj {
                cnpj: normalize_cnpj(&req.parametro_texto())?,
            }),
            TipoConsulta::CpfAlternativa => Ok(Self::CpfAlternativa {
                payload: chaves_alternativas(req, tipo)?,
            }),
            TipoConsulta::CnpjRazaoSocial => Ok(Self::CnpjRazaoSocial {
                payload: chaves_alternativas(req, tipo)?,
            }),
            TipoConsulta::CepRuaCidade => {
                let params = req.parametro_json()?;
                let campo = |nome: &str| {
                    params
                        .get(nome)
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(String::from)
                };
                match (campo("estado"), campo("cidade"), campo("logradouro")) {
                    (Some(estado), Some(cidade), Some(logradouro)) => Ok(Self::CepRuaCidade {
                        uf: validate_uf(&estado)?,
                        cidade,
                        logradouro,
                    }),
                    _ => Err(AppError::Validation(
                        "Os campos 'estado', 'cidade' e 'logradouro' devem ser strings não vazias."
                            .into(),
                    )),
                }
            }
            _ => Err(AppError::BadRequest("Tipo de consulta inválido.".into())),
        }
    }

    /// Parameter as stored in the history.
    pub fn parametro_historico(&self) -> String {
        match self {
            Self::Endereco { cep } => cep.clone(),
            Self::Cpf { cpf } => cpf.clone(),
            Self::Cnpj { cnpj } => cnpj.clone(),
            Self::CpfAlternativa { payload } | Self::CnpjRazaoSocial { payload } => {
                payload.to_string()
            }
            Self::CepRuaCidade {
                uf,
                cidade,
                logradouro,
            } => serde_json::json!({
                "estado": uf,
                "cidade": cidade,
                "logradouro": logradouro,
            })
            .to_string(),
        }
    }
}

/// BigDataCorp payload for a name-based lookup: needs `Datasets`, `q` and
/// `Limit`, and `q` must carry a `name{...}` key.
fn chaves_alternativas(req: &ConsultaRequest, tipo: TipoConsulta) -> AppResult<Value> {
    let params: Map<String, Value> = req.parametro_json()?;
    if !["Datasets", "q", "Limit"].iter().all(|k| params.contains_key(*k)) {
        return Err(AppError::Validation(format!(
            "JSON de parametro_consulta para '{}' deve conter 'Datasets', 'q' e 'Limit'.",
            tipo.as_str()
        )));
    }
    let tem_nome = params
        .get("q")
        .and_then(Value::as_str)
        .map(|q| q.replace(' ', "").contains("name{"))
        .unwrap_or(false);
    if !tem_nome {
        return Err(AppError::Validation(
            "O campo 'q' deve ser uma string e conter o nome na chave 'name{}'.".into(),
        ));
    }
    Ok(Value::Object(params))
}

#[async_trait]
pub trait ConsultaServiceTrait: Send + Sync {
    /// Runs a single lookup and records it.
    async fn realizar(&self, user: &AuthUser, req: ConsultaRequest) -> AppResult<ConsultaResultado>;

    /// Caller's history; admins see every user's.
    async fn historico(
        &self,
        user: &AuthUser,
        params: PageParams,
    ) -> AppResult<PaginatedData<HistoricoItem>>;

    async fn historico_detalhe(&self, user: &AuthUser, id: i64) -> AppResult<HistoricoItem>;

    /// One user's history; admin or the user themself.
    async fn historico_usuario(
        &self,
        user: &AuthUser,
        usuario_id: i64,
        params: PageParams,
    ) -> AppResult<PaginatedData<HistoricoItem>>;
}

pub struct ConsultaService {
    providers: Providers,
    historico: Arc<dyn HistoricoRepository>,
}

impl ConsultaService {
    pub fn new(providers: Providers, historico: Arc<dyn HistoricoRepository>) -> Self {
        Self {
            providers,
            historico,
        }
    }

    async fn executar(&self, consulta: &ConsultaValidada) -> AppResult<Value> {
        let resultado = match consulta {
            ConsultaValidada::Endereco { cep } => self.providers.brasilapi.cep(cep).await?,
            ConsultaValidada::Cpf { cpf } => {
                self.providers.bigdata.pessoas(&basic_data_payload(cpf)).await?
            }
            ConsultaValidada::Cnpj { cnpj } => self.providers.brasilapi.cnpj(cnpj).await?,
            ConsultaValidada::CpfAlternativa { payload } => {
                self.providers.bigdata.pessoas(payload).await?
            }
            ConsultaValidada::CnpjRazaoSocial { payload } => {
                let empresas = self.providers.bigdata.empresas(payload).await?;
                let cnpj = first_tax_id(&empresas).map(|c| only_digits(&c)).ok_or_else(|| {
                    AppError::BadRequest(
                        "Nenhum CNPJ encontrado para a razão social informada.".into(),
                    )
                })?;
                tracing::debug!(cnpj = %cnpj, "razão social resolvida");
                self.providers.brasilapi.cnpj(&cnpj).await?
            }
            ConsultaValidada::CepRuaCidade {
                uf,
                cidade,
                logradouro,
            } => {
                self.providers
                    .viacep
                    .buscar_por_endereco(uf, cidade, logradouro)
                    .await?
            }
        };
        Ok(resultado)
    }
}

#[async_trait]
impl ConsultaServiceTrait for ConsultaService {
    async fn realizar(&self, user: &AuthUser, req: ConsultaRequest) -> AppResult<ConsultaResultado> {
        let consulta = ConsultaValidada::from_request(&req)?;
        let resultado = self.executar(&consulta).await?;

        registrar(
            self.historico.as_ref(),
            user,
            Registro {
                tipo_consulta: &req.tipo_consulta,
                parametro: consulta.parametro_historico(),
                origem: req.origem(),
                lote_id: req.lote_id,
                resultado,
                mensagem: MENSAGEM_SUCESSO,
            },
        )
        .await
    }

    async fn historico(
        &self,
        user: &AuthUser,
        params: PageParams,
    ) -> AppResult<PaginatedData<HistoricoItem>> {
        let (page, page_size) = params.resolve(HISTORICO_PAGE_SIZE, HISTORICO_MAX_PAGE_SIZE);
        let filtro = if user.is_admin() {
            None
        } else {
            Some(user.user_id())
        };
        let (items, total) = self.historico.list(filtro, page, page_size).await?;
        Ok(PaginatedData::new(items, page, page_size, total))
    }

    async fn historico_detalhe(&self, user: &AuthUser, id: i64) -> AppResult<HistoricoItem> {
        let item = self
            .historico
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Consulta não encontrada.".into()))?;
        if !user.is_admin() && item.usuario != Some(user.user_id()) {
            return Err(AppError::Forbidden(
                "Você não tem permissão para acessar esta consulta.".into(),
            ));
        }
        Ok(item)
    }

    async fn historico_usuario(
        &self,
        user: &AuthUser,
        usuario_id: i64,
        params: PageParams,
    ) -> AppResult<PaginatedData<HistoricoItem>> {
        if !user.is_admin() && user.user_id() != usuario_id {
            return Err(AppError::Forbidden(
                "Você não tem permissão para acessar o histórico deste usuário.".into(),
            ));
        }
        let (page, page_size) = params.resolve(HISTORICO_PAGE_SIZE, HISTORICO_MAX_PAGE_SIZE);
        let (items, total) = self.historico.list(Some(usuario_id), page, page_size).await?;
        Ok(PaginatedData::new(items, page, page_size, total))
    }
}
