//! User access levels and the public user projection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NivelAcesso {
    Admin,
    #[default]
    Usuario,
    Comercial,
    Moderador,
    Recepcionista,
    Ti,
    Faturamento,
}

impl NivelAcesso {
    pub fn as_str(&self) -> &'static str {
        match self {
            NivelAcesso::Admin => "admin",
            NivelAcesso::Usuario => "usuario",
            NivelAcesso::Comercial => "comercial",
            NivelAcesso::Moderador => "moderador",
            NivelAcesso::Recepcionista => "recepcionista",
            NivelAcesso::Ti => "ti",
            NivelAcesso::Faturamento => "faturamento",
        }
    }

    /// Human readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            NivelAcesso::Admin => "Administrador",
            NivelAcesso::Usuario => "Usuário Comum",
            NivelAcesso::Comercial => "Comercial",
            NivelAcesso::Moderador => "Moderador",
            NivelAcesso::Recepcionista => "Recepcionista",
            NivelAcesso::Ti => "TI",
            NivelAcesso::Faturamento => "Faturamento",
        }
    }
}

impl fmt::Display for NivelAcesso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NivelAcesso {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(NivelAcesso::Admin),
            "usuario" => Ok(NivelAcesso::Usuario),
            "comercial" => Ok(NivelAcesso::Comercial),
            "moderador" => Ok(NivelAcesso::Moderador),
            "recepcionista" => Ok(NivelAcesso::Recepcionista),
            "ti" => Ok(NivelAcesso::Ti),
            "faturamento" => Ok(NivelAcesso::Faturamento),
            other => Err(format!("nível de acesso desconhecido: {other}")),
        }
    }
}

/// User as exposed by the API (never carries the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioResumo {
    pub id: i64,
    pub email: String,
    pub nome_completo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub nivel_acesso: NivelAcesso,
    pub is_active: bool,
    pub is_fed: bool,
    pub data_criacao: DateTime<Utc>,
}
