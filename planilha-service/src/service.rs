//! Spreadsheet processing.
//!
//! Rows are looked up one at a time through consulta-service; every input
//! row produces exactly one output row, in input order.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::errors::AppResult;
use common::middleware::AuthUser;
use common::models::{ConsultaRequest, OrigemConsulta, TipoConsulta};
use common::utils::documento::only_digits;

use crate::client::{detalhe_falha, ConsultaClient};
use crate::layout::{texto, TipoPlanilha};
use crate::massa::{self, LinhaMassa};
use crate::workbook::Planilha;

/// Generated spreadsheet ready to be downloaded.
pub struct Arquivo {
    pub nome: String,
    pub bytes: Vec<u8>,
}

/// Uploaded rows. Only the list matching the route's kind is read.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProcessamentoEntrada {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub cpfs: Vec<HashMap<String, Value>>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub cnpjs: Vec<HashMap<String, Value>>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub ceps: Vec<HashMap<String, Value>>,
    /// Defaults to `planilha`.
    #[serde(default)]
    pub origem: Option<OrigemConsulta>,
}

impl ProcessamentoEntrada {
    fn linhas(&self, tipo: TipoPlanilha) -> &[HashMap<String, Value>] {
        match tipo {
            TipoPlanilha::Cpf => &self.cpfs,
            TipoPlanilha::Cnpj => &self.cnpjs,
            TipoPlanilha::Cep => &self.ceps,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MassaEntrada {
    #[validate(length(min = 1, message = "Informe ao menos um CNPJ."))]
    pub cnpjs: Vec<String>,
}

pub struct PlanilhaService {
    consulta: ConsultaClient,
}

impl PlanilhaService {
    pub fn new(consulta: ConsultaClient) -> Self {
        Self { consulta }
    }

    /// Looks up every uploaded document and returns the result workbook.
    pub async fn processar(
        &self,
        user: &AuthUser,
        tipo: TipoPlanilha,
        entrada: ProcessamentoEntrada,
    ) -> AppResult<Arquivo> {
        let origem = entrada.origem.unwrap_or(OrigemConsulta::Planilha);
        let lote_id = (origem == OrigemConsulta::Planilha).then(Uuid::new_v4);
        let linhas = entrada.linhas(tipo);
        tracing::info!(
            tipo = tipo.as_str(),
            linhas = linhas.len(),
            lote_id = ?lote_id,
            user_id = user.user_id(),
            "processando planilha"
        );

        let mut planilha = Planilha::new(tipo.sheet_resultado(), tipo.colunas())?;
        let mut falhas = 0usize;

        for (i, linha) in linhas.iter().enumerate() {
            let documento = texto(linha.get(tipo.chave())).trim().to_string();
            if documento.is_empty() {
                tracing::warn!(linha = i + 1, "documento ausente na linha");
                falhas += 1;
                let erro = format!("{} não fornecido na linha da planilha.", tipo.chave());
                planilha.push(&tipo.linha_falha("", &erro))?;
                continue;
            }

            let req = ConsultaRequest::new(tipo.tipo_consulta(), documento.clone())
                .with_origem(origem)
                .with_lote(lote_id);

            let valores = match self.consulta.realizar(&user.token, &req).await {
                Ok(resultado) if !vazio(&resultado.resultado_api) => {
                    tracing::debug!(documento = %documento, "consulta concluída");
                    tipo.linha_sucesso(&documento, &resultado.resultado_api)
                }
                Ok(resultado) => {
                    falhas += 1;
                    tipo.linha_falha(&documento, &format!("API: {}", resultado.mensagem))
                }
                Err(err) => {
                    tracing::warn!(documento = %documento, error = %err, "consulta falhou");
                    falhas += 1;
                    tipo.linha_falha(&documento, &detalhe_falha(&err))
                }
            };
            planilha.push(&valores)?;
        }

        tracing::info!(
            tipo = tipo.as_str(),
            linhas = planilha.linhas(),
            falhas,
            "planilha de resultados gerada"
        );
        Ok(Arquivo {
            nome: tipo.arquivo_resultado(),
            bytes: planilha.into_bytes()?,
        })
    }

    /// Partners of each CNPJ with their contact data.
    pub async fn consulta_massa(&self, user: &AuthUser, entrada: MassaEntrada) -> AppResult<Arquivo> {
        entrada.validate()?;
        tracing::info!(cnpjs = entrada.cnpjs.len(), user_id = user.user_id(), "consulta em massa iniciada");

        let mut planilha = Planilha::new(massa::SHEET, &massa::COLUNAS)?;
        for cnpj_original in &entrada.cnpjs {
            for linha in self.linhas_cnpj(&user.token, cnpj_original).await {
                planilha.push(&linha.valores())?;
            }
        }

        tracing::info!(linhas = planilha.linhas(), "consulta em massa concluída");
        Ok(Arquivo {
            nome: massa::ARQUIVO.to_string(),
            bytes: planilha.into_bytes()?,
        })
    }

    async fn linhas_cnpj(&self, token: &str, cnpj_original: &str) -> Vec<LinhaMassa> {
        let cnpj = only_digits(cnpj_original);
        if cnpj.len() != 14 {
            return vec![LinhaMassa::sem_socio(
                cnpj_original,
                "N/A",
                "Erro CNPJ",
                "CNPJ inválido ou vazio após limpeza.",
            )];
        }

        let relacionamentos = ConsultaRequest::new(TipoConsulta::CnpjComercial, cnpj.clone())
            .with_origem(OrigemConsulta::Massa);
        let relacionamentos = match self.consulta.comercial(token, &relacionamentos).await {
            Ok(resultado) => resultado.resultado_api,
            Err(err) => {
                tracing::warn!(cnpj = %cnpj, error = %err, "falha nos relacionamentos do CNPJ");
                return vec![LinhaMassa::sem_socio(
                    cnpj_original,
                    "N/A",
                    "Erro CNPJ",
                    format!("Erro ao consultar CNPJ: {}", detalhe_falha(&err)),
                )];
            }
        };

        let razao_social = self.razao_social(token, &cnpj).await;
        let socios = massa::socios(&relacionamentos);
        if socios.is_empty() {
            return vec![LinhaMassa::sem_socio(
                cnpj_original,
                &razao_social,
                "Aviso",
                "Nenhum CPF relevante encontrado para este CNPJ ou não se enquadra nos tipos de relacionamento relevantes (QSA, Ownership, REPRESENTANTELEGAL).",
            )];
        }

        let mut linhas = Vec::with_capacity(socios.len());
        for socio in socios {
            let req = ConsultaRequest::new(TipoConsulta::Comercial, socio.cpf.clone())
                .with_origem(OrigemConsulta::Massa);
            let mut linha = LinhaMassa::sem_socio(cnpj_original, &razao_social, "Erro", "");
            match self.consulta.contato(token, &req).await {
                Ok(resultado) => match massa::contato(&resultado.resultado_api) {
                    Some(contato) => {
                        linha.contato = contato;
                        linha.status = "Sucesso".into();
                        linha.detalhes = "OK".into();
                    }
                    None => {
                        linha.status = "Aviso".into();
                        linha.detalhes =
                            "Resposta da consulta CPF não contém 'Result' ou está vazia.".into();
                    }
                },
                Err(err) => {
                    tracing::warn!(cpf = %socio.cpf, error = %err, "falha na consulta do sócio");
                    linha.detalhes = detalhe_falha(&err);
                }
            }
            linha.socio = Some(socio);
            linhas.push(linha);
        }
        linhas
    }

    async fn razao_social(&self, token: &str, cnpj: &str) -> String {
        let req = ConsultaRequest::new(TipoConsulta::Cnpj, cnpj.to_string())
            .with_origem(OrigemConsulta::Massa);
        match self.consulta.realizar(token, &req).await {
            Ok(resultado) => match resultado.resultado_api.get("razao_social") {
                Some(Value::String(nome)) if !nome.is_empty() => nome.clone(),
                _ => "N/A".to_string(),
            },
            Err(err) => {
                tracing::warn!(cnpj, error = %err, "razão social indisponível");
                "Erro BrasilAPI".to_string()
            }
        }
    }
}

fn vazio(valor: &Value) -> bool {
    match valor {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
