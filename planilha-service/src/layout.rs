//! Column layouts of the template and result spreadsheets.

use std::str::FromStr;

use serde_json::Value;

use common::errors::AppError;
use common::models::TipoConsulta;

pub const STATUS_SUCESSO: &str = "SUCESSO";
pub const STATUS_FALHA: &str = "FALHA";

/// Header text and column width.
#[derive(Debug, Clone, Copy)]
pub struct Coluna {
    pub header: &'static str,
    pub width: f64,
}

const fn col(header: &'static str, width: f64) -> Coluna {
    Coluna { header, width }
}

const COLUNAS_CPF: [Coluna; 12] = [
    col("CPF (Entrada)", 20.0),
    col("STATUS CONSULTA", 18.0),
    col("Nome Completo", 40.0),
    col("CPF", 20.0),
    col("Situação Cadastral", 25.0),
    col("Data de Nascimento", 20.0),
    col("Nome da Mãe", 40.0),
    col("Nome do Pai", 40.0),
    col("Gênero", 10.0),
    col("Idade", 10.0),
    col("Nome Comum (Alias)", 30.0),
    col("ERRO_DETALHES", 40.0),
];

const COLUNAS_CNPJ: [Coluna; 16] = [
    col("CNPJ (Entrada)", 25.0),
    col("STATUS CONSULTA", 18.0),
    col("Razão Social", 40.0),
    col("CNPJ (Retornado)", 25.0),
    col("Atividade Principal", 50.0),
    col("Telefone", 15.0),
    col("Telefone 2", 15.0),
    col("Logradouro", 40.0),
    col("Número", 15.0),
    col("Complemento", 20.0),
    col("Bairro", 25.0),
    col("Município", 25.0),
    col("UF", 10.0),
    col("CEP", 15.0),
    col("Situação Cadastral", 25.0),
    col("ERRO_DETALHES", 40.0),
];

const COLUNAS_CEP: [Coluna; 9] = [
    col("CEP (Entrada)", 15.0),
    col("STATUS CONSULTA", 18.0),
    col("CEP", 15.0),
    col("Logradouro", 40.0),
    col("Bairro", 25.0),
    col("Cidade", 25.0),
    col("UF", 10.0),
    col("Complemento", 20.0),
    col("ERRO_DETALHES", 40.0),
];

/// Downloadable template: one header cell and a few example values.
#[derive(Debug, Clone, Copy)]
pub struct Modelo {
    pub sheet: &'static str,
    pub header: &'static str,
    pub exemplos: [&'static str; 3],
    pub width: f64,
    pub arquivo: &'static str,
}

/// Document kind a spreadsheet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoPlanilha {
    Cpf,
    Cnpj,
    Cep,
}

impl FromStr for TipoPlanilha {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpf" => Ok(TipoPlanilha::Cpf),
            "cnpj" => Ok(TipoPlanilha::Cnpj),
            "cep" => Ok(TipoPlanilha::Cep),
            _ => Err(AppError::NotFound(
                "Tipo de planilha inválido. Use cpf, cnpj ou cep.".into(),
            )),
        }
    }
}

impl TipoPlanilha {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPlanilha::Cpf => "cpf",
            TipoPlanilha::Cnpj => "cnpj",
            TipoPlanilha::Cep => "cep",
        }
    }

    /// Key of the document in each uploaded row (`{"CPF": "..."}`).
    pub fn chave(&self) -> &'static str {
        match self {
            TipoPlanilha::Cpf => "CPF",
            TipoPlanilha::Cnpj => "CNPJ",
            TipoPlanilha::Cep => "CEP",
        }
    }

    pub fn tipo_consulta(&self) -> TipoConsulta {
        match self {
            TipoPlanilha::Cpf => TipoConsulta::Cpf,
            TipoPlanilha::Cnpj => TipoConsulta::Cnpj,
            TipoPlanilha::Cep => TipoConsulta::Endereco,
        }
    }

    pub fn modelo(&self) -> Modelo {
        match self {
            TipoPlanilha::Cpf => Modelo {
                sheet: "CPFs para Consulta",
                header: "CPF",
                exemplos: ["000.000.000-00", "00000000000", "123.456.789-00"],
                width: 20.0,
                arquivo: "planilha-modelo-cpf.xlsx",
            },
            TipoPlanilha::Cnpj => Modelo {
                sheet: "CNPJs para Consulta",
                header: "CNPJ",
                exemplos: ["33.647.553/0001-90", "33649575000199", "41.096.250/0001-54"],
                width: 25.0,
                arquivo: "planilha-modelo-cnpj.xlsx",
            },
            TipoPlanilha::Cep => Modelo {
                sheet: "CEPs para Consulta",
                header: "CEP",
                exemplos: ["20000-000", "22000000", "99999-999"],
                width: 20.0,
                arquivo: "planilha-modelo-cep.xlsx",
            },
        }
    }

    pub fn colunas(&self) -> &'static [Coluna] {
        match self {
            TipoPlanilha::Cpf => &COLUNAS_CPF,
            TipoPlanilha::Cnpj => &COLUNAS_CNPJ,
            TipoPlanilha::Cep => &COLUNAS_CEP,
        }
    }

    /// Sheet name of the result workbook.
    pub fn sheet_resultado(&self) -> &'static str {
        match self {
            TipoPlanilha::Cpf => "Resultados da Consulta CPF",
            TipoPlanilha::Cnpj => "Resultados da Consulta",
            TipoPlanilha::Cep => "Resultados da Consulta CEP",
        }
    }

    pub fn arquivo_resultado(&self) -> String {
        format!("planilha-resultado-{}.xlsx", self.as_str())
    }

    /// Result row for a successful lookup; `dados` is the provider payload.
    pub fn linha_sucesso(&self, entrada: &str, dados: &Value) -> Vec<String> {
        let mut linha = vec![entrada.to_string(), STATUS_SUCESSO.to_string()];
        match self {
            TipoPlanilha::Cpf => {
                let basic = dados.pointer("/Result/0/BasicData").unwrap_or(&Value::Null);
                let nascimento = texto(basic.get("BirthDate"));
                linha.extend([
                    texto(basic.get("Name")),
                    texto(basic.get("TaxIdNumber")),
                    texto(basic.get("TaxIdStatus")),
                    nascimento.split('T').next().unwrap_or_default().to_string(),
                    texto(basic.get("MotherName")),
                    texto(basic.get("FatherName")),
                    texto(basic.get("Gender")),
                    texto(basic.get("Age")),
                    texto(basic.pointer("/Aliases/CommonName")),
                ]);
            }
            TipoPlanilha::Cnpj => {
                linha.extend(
                    [
                        "razao_social",
                        "cnpj",
                        "cnae_fiscal_descricao",
                        "ddd_telefone_1",
                        "ddd_telefone_2",
                        "logradouro",
                        "numero",
                        "complemento",
                        "bairro",
                        "municipio",
                        "uf",
                        "cep",
                        "descricao_situacao_cadastral",
                    ]
                    .iter()
                    .map(|campo| texto(dados.get(*campo))),
                );
            }
            TipoPlanilha::Cep => {
                linha.extend(
                    ["cep", "street", "neighborhood", "city", "state", "complement"]
                        .iter()
                        .map(|campo| texto(dados.get(*campo))),
                );
            }
        }
        linha.push(String::new());
        linha
    }

    /// Result row for a failed lookup: entry, `FALHA` and the error text.
    pub fn linha_falha(&self, entrada: &str, erro: &str) -> Vec<String> {
        let total = self.colunas().len();
        let mut linha = vec![String::new(); total];
        linha[0] = entrada.to_string();
        linha[1] = STATUS_FALHA.to_string();
        linha[total - 1] = erro.to_string();
        linha
    }
}

/// Cell text for a JSON value: strings verbatim, null as empty.
pub fn texto(valor: Option<&Value>) -> String {
    match valor {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
