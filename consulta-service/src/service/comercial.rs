//! Commercial prospecting: company relationships, contact data and
//! real-estate companies by region.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, ConsultaResultado, TipoConsulta};
use common::utils::{normalize_cnpj, normalize_cpf};

use crate::providers::bigdatacorp::{registration_payload, relationships_payload};
use crate::providers::{BigDataClient, MinhaReceitaClient};
use crate::repository::HistoricoRepository;

use super::{registrar, Registro};

/// Real-estate CNAEs searched by region. `6821*` are agencies, `6822600`
/// are property administrators.
pub const CNAES_IMOBILIARIOS: [&str; 3] = ["6821801", "6821802", "6822600"];

/// Region filter; values are compared case-insensitively.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FiltroRegiao {
    #[serde(default)]
    pub uf: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub bairro: Option<String>,
}

/// Company found by the region search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmpresaRegiao {
    pub nome: Option<String>,
    pub tipo: String,
    pub endereco: String,
    pub cep: String,
    pub telefone: String,
    pub cnpj: String,
    pub mei: String,
    pub porte: String,
    pub cnae: String,
}

pub struct ComercialService {
    bigdata: BigDataClient,
    minhareceita: MinhaReceitaClient,
    historico: Arc<dyn HistoricoRepository>,
}

impl ComercialService {
    pub fn new(
        bigdata: BigDataClient,
        minhareceita: MinhaReceitaClient,
        historico: Arc<dyn HistoricoRepository>,
    ) -> Self {
        Self {
            bigdata,
            minhareceita,
            historico,
        }
    }

    /// Partners and relationships of a company.
    pub async fn consultar_cnpj(
        &self,
        user: &AuthUser,
        req: ConsultaRequest,
    ) -> AppResult<ConsultaResultado> {
        exigir_tipo(&req, TipoConsulta::CnpjComercial)?;
        let cnpj = normalize_cnpj(&req.parametro_texto())?;
        let resultado = self.bigdata.empresas(&relationships_payload(&cnpj)).await?;

        registrar(
            self.historico.as_ref(),
            user,
            Registro {
                tipo_consulta: TipoConsulta::CnpjComercial.as_str(),
                parametro: cnpj,
                origem: req.origem(),
                lote_id: req.lote_id,
                resultado,
                mensagem: "Consulta de CNPJ realizada com sucesso.",
            },
        )
        .await
    }

    /// Registration data (phones, addresses, e-mails) of a person.
    pub async fn consultar_contato(
        &self,
        user: &AuthUser,
        req: ConsultaRequest,
    ) -> AppResult<ConsultaResultado> {
        exigir_tipo(&req, TipoConsulta::Comercial)?;
        let cpf = normalize_cpf(&req.parametro_texto())?;
        let resultado = self.bigdata.pessoas(&registration_payload(&cpf)).await?;

        registrar(
            self.historico.as_ref(),
            user,
            Registro {
                tipo_consulta: TipoConsulta::Comercial.as_str(),
                parametro: cpf,
                origem: req.origem(),
                lote_id: req.lote_id,
                resultado,
                mensagem: "Consulta de contato comercial realizada com sucesso.",
            },
        )
        .await
    }

    /// Agencies and administrators in a city, optionally one neighborhood.
    ///
    /// The CNAEs are queried concurrently; a failing CNAE is logged and
    /// contributes nothing.
    pub async fn empresas_regiao(&self, filtro: FiltroRegiao) -> AppResult<Vec<EmpresaRegiao>> {
        let uf = filtro.uf.trim().to_uppercase();
        let cidade = filtro.cidade.trim().to_uppercase();
        let bairro = filtro
            .bairro
            .as_deref()
            .map(|b| b.trim().to_uppercase())
            .filter(|b| !b.is_empty());

        if uf.is_empty() || cidade.is_empty() {
            return Err(AppError::BadRequest(
                "UF e Cidade são obrigatórios para a pesquisa.".into(),
            ));
        }

        let buscas = CNAES_IMOBILIARIOS.iter().map(|cnae| {
            let uf = uf.as_str();
            async move { (*cnae, self.minhareceita.por_cnae(cnae, uf).await) }
        });

        let mut empresas = Vec::new();
        for (cnae, resultado) in join_all(buscas).await {
            match resultado {
                Ok(itens) => {
                    let antes = itens.len();
                    let filtradas: Vec<EmpresaRegiao> = itens
                        .iter()
                        .filter(|e| na_regiao(e, &cidade, bairro.as_deref()))
                        .map(|e| mapear_empresa(e, cnae))
                        .collect();
                    tracing::debug!(cnae, antes, depois = filtradas.len(), "empresas filtradas");
                    empresas.extend(filtradas);
                }
                Err(err) => tracing::warn!(cnae, uf = %uf, error = %err, "falha ao buscar CNAE"),
            }
        }
        Ok(empresas)
    }
}

fn exigir_tipo(req: &ConsultaRequest, esperado: TipoConsulta) -> AppResult<()> {
    if req.tipo_consulta.trim().to_lowercase() == esperado.as_str() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Tipo de consulta inválido para esta rota.".into(),
        ))
    }
}

fn campo_upper(empresa: &Value, chave: &str) -> String {
    empresa
        .get(chave)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_uppercase()
}

fn na_regiao(empresa: &Value, cidade: &str, bairro: Option<&str>) -> bool {
    campo_upper(empresa, "municipio") == cidade
        && bairro.map_or(true, |b| campo_upper(empresa, "bairro") == b)
}

/// Text form of a field; `default` when missing or null.
fn texto(empresa: &Value, chave: &str, default: &str) -> String {
    match empresa.get(chave) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn mapear_empresa(empresa: &Value, cnae: &str) -> EmpresaRegiao {
    let nome = ["razao_social", "nome_fantasia"]
        .iter()
        .filter_map(|k| empresa.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(String::from);
    let tipo = if cnae.starts_with("6821") {
        "Imobiliária"
    } else {
        "Administradora"
    };
    let endereco = format!(
        "{}, {} - {}, {} - {}",
        texto(empresa, "logradouro", ""),
        texto(empresa, "numero", ""),
        texto(empresa, "bairro", ""),
        texto(empresa, "municipio", ""),
        texto(empresa, "uf", ""),
    );

    EmpresaRegiao {
        nome,
        tipo: tipo.to_string(),
        endereco,
        cep: texto(empresa, "cep", "Sem CEP"),
        telefone: texto(empresa, "ddd_telefone_1", "Sem Telefone"),
        cnpj: texto(empresa, "cnpj", "Não encontrado"),
        mei: texto(empresa, "opcao_pelo_mei", "false"),
        porte: texto(empresa, "porte", "Não informado"),
        cnae: cnae.to_string(),
    }
}
