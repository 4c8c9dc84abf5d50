//! Lookup request/response DTOs shared by consulta-service and its clients.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::AppError;

/// Kind of lookup recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TipoConsulta {
    #[serde(rename = "cpf")]
    Cpf,
    #[serde(rename = "cnpj")]
    Cnpj,
    #[serde(rename = "endereco")]
    Endereco,
    #[serde(rename = "cpf_alternativa")]
    CpfAlternativa,
    #[serde(rename = "cnpj_razao_social")]
    CnpjRazaoSocial,
    #[serde(rename = "cep_rua_cidade")]
    CepRuaCidade,
    #[serde(rename = "cnpj_comercial")]
    CnpjComercial,
    #[serde(rename = "comercial")]
    Comercial,
    #[serde(rename = "vida")]
    Vida,
    #[serde(rename = "incendio")]
    Incendio,
    #[serde(rename = "faturas")]
    Faturas,
    #[serde(rename = "estudo-incendio")]
    EstudoIncendio,
}

impl TipoConsulta {
    pub const ALL: [TipoConsulta; 12] = [
        TipoConsulta::Cpf,
        TipoConsulta::Cnpj,
        TipoConsulta::Endereco,
        TipoConsulta::CpfAlternativa,
        TipoConsulta::CnpjRazaoSocial,
        TipoConsulta::CepRuaCidade,
        TipoConsulta::CnpjComercial,
        TipoConsulta::Comercial,
        TipoConsulta::Vida,
        TipoConsulta::Incendio,
        TipoConsulta::Faturas,
        TipoConsulta::EstudoIncendio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoConsulta::Cpf => "cpf",
            TipoConsulta::Cnpj => "cnpj",
            TipoConsulta::Endereco => "endereco",
            TipoConsulta::CpfAlternativa => "cpf_alternativa",
            TipoConsulta::CnpjRazaoSocial => "cnpj_razao_social",
            TipoConsulta::CepRuaCidade => "cep_rua_cidade",
            TipoConsulta::CnpjComercial => "cnpj_comercial",
            TipoConsulta::Comercial => "comercial",
            TipoConsulta::Vida => "vida",
            TipoConsulta::Incendio => "incendio",
            TipoConsulta::Faturas => "faturas",
            TipoConsulta::EstudoIncendio => "estudo-incendio",
        }
    }

    /// Label shown in the history screens.
    pub fn display_name(&self) -> &'static str {
        match self {
            TipoConsulta::Cpf => "Consulta de CPF",
            TipoConsulta::Cnpj => "Consulta de CNPJ",
            TipoConsulta::Endereco => "Consulta de Endereço",
            TipoConsulta::CpfAlternativa => "Consulta de CPF por Chaves Alternativas",
            TipoConsulta::CnpjRazaoSocial => "Consulta de CNPJ por Razão Social",
            TipoConsulta::CepRuaCidade => "Consulta de CEP por Chaves Alternativas",
            TipoConsulta::CnpjComercial => "Consulta Comercial de CNPJ",
            TipoConsulta::Comercial => "Consulta contato Comercial",
            TipoConsulta::Vida => "Consulta de segurados Vida",
            TipoConsulta::Incendio => "Consulta de segurados Incendio",
            TipoConsulta::Faturas => "Consulta de faturas",
            TipoConsulta::EstudoIncendio => "Estudo de Cotação Incendio",
        }
    }
}

impl fmt::Display for TipoConsulta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipoConsulta {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TipoConsulta::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| AppError::BadRequest("Tipo de consulta inválido.".to_string()))
    }
}

/// Where a lookup was triggered from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrigemConsulta {
    #[default]
    Manual,
    #[serde(alias = "planilha_upload")]
    Planilha,
    Massa,
}

impl OrigemConsulta {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrigemConsulta::Manual => "manual",
            OrigemConsulta::Planilha => "planilha",
            OrigemConsulta::Massa => "massa",
        }
    }

    /// Parses a stored value; unknown values read as `Manual`.
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "planilha" | "planilha_upload" => OrigemConsulta::Planilha,
            "massa" => OrigemConsulta::Massa,
            _ => OrigemConsulta::Manual,
        }
    }
}

/// Body of every single lookup endpoint.
///
/// `parametro_consulta` is a plain string for document lookups and a JSON
/// object (or its string form) for the alternative-key and insurance lookups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConsultaRequest {
    pub tipo_consulta: String,
    #[schema(value_type = Object)]
    pub parametro_consulta: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origem: Option<OrigemConsulta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lote_id: Option<Uuid>,
}

impl ConsultaRequest {
    pub fn new(tipo: TipoConsulta, parametro: impl Into<Value>) -> Self {
        Self {
            tipo_consulta: tipo.as_str().to_string(),
            parametro_consulta: parametro.into(),
            origem: None,
            lote_id: None,
        }
    }

    pub fn with_origem(mut self, origem: OrigemConsulta) -> Self {
        self.origem = Some(origem);
        self
    }

    pub fn with_lote(mut self, lote_id: Option<Uuid>) -> Self {
        self.lote_id = lote_id;
        self
    }

    pub fn tipo(&self) -> Result<TipoConsulta, AppError> {
        self.tipo_consulta.parse()
    }

    pub fn origem(&self) -> OrigemConsulta {
        self.origem.unwrap_or_default()
    }

    /// Parameter as text: strings verbatim, anything else as compact JSON.
    pub fn parametro_texto(&self) -> String {
        match &self.parametro_consulta {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parameter as a JSON object, parsing it when it was sent as a string.
    pub fn parametro_json(&self) -> Result<serde_json::Map<String, Value>, AppError> {
        let value = match &self.parametro_consulta {
            Value::String(s) => serde_json::from_str::<Value>(s).map_err(|_| {
                AppError::Validation("Parâmetro de consulta deve ser um JSON válido.".to_string())
            })?,
            other => other.clone(),
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::Validation(
                "Parâmetro de consulta deve ser um objeto JSON.".to_string(),
            )),
        }
    }
}

/// History row as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoricoItem {
    pub id: i64,
    pub usuario: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario_email: Option<String>,
    pub tipo_consulta: String,
    pub tipo_consulta_display: String,
    pub origem: OrigemConsulta,
    pub parametro_consulta: String,
    pub data_consulta: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub resultado: Option<Value>,
    pub lote_id: Option<Uuid>,
}

/// Label for a stored `tipo_consulta`, falling back to the raw value.
pub fn tipo_display(raw: &str) -> String {
    raw.parse::<TipoConsulta>()
        .map(|t| t.display_name().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Success payload of a lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConsultaResultado {
    pub mensagem: String,
    #[schema(value_type = Object)]
    pub resultado_api: Value,
    pub historico_salvo: HistoricoItem,
    pub origem: OrigemConsulta,
}

/// `?page=&page_size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Resolves `(page, page_size)`, clamping the size to `1..=max`.
    pub fn resolve(&self, default_size: u32, max_size: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self.page_size.unwrap_or(default_size).clamp(1, max_size);
        (page, size)
    }
}
