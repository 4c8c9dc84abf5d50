//! Bulk commercial consultation: partners of each company and their contacts.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use common::utils::documento::only_digits;

use crate::layout::{texto, Coluna};

pub const SHEET: &str = "Resultados CPF";
pub const ARQUIVO: &str = "resultados_consulta_massa_cpf.xlsx";

const NA: &str = "N/A";

/// Relationship types whose CPF holders are looked up.
const TIPOS_SOCIO: [&str; 3] = ["QSA", "OWNERSHIP", "REPRESENTANTELEGAL"];

pub const COLUNAS: [Coluna; 16] = [
    Coluna { header: "CNPJ Original", width: 22.0 },
    Coluna { header: "Razão Social CNPJ", width: 40.0 },
    Coluna { header: "CPF", width: 16.0 },
    Coluna { header: "Nome Relacionado ao CNPJ", width: 40.0 },
    Coluna { header: "Tipo de Relacionamento (CNPJ)", width: 22.0 },
    Coluna { header: "Nome do Relacionamento (CNPJ)", width: 30.0 },
    Coluna { header: "Nome do CPF (Consulta Detalhada)", width: 40.0 },
    Coluna { header: "Data Nascimento CPF (Consulta Detalhada)", width: 18.0 },
    Coluna { header: "Email Principal (Consulta Detalhada)", width: 35.0 },
    Coluna { header: "Email Secundário (Consulta Detalhada)", width: 35.0 },
    Coluna { header: "Telefone Principal (Consulta Detalhada)", width: 22.0 },
    Coluna { header: "Telefone Secundário (Consulta Detalhada)", width: 22.0 },
    Coluna { header: "Endereço Principal (Consulta Detalhada)", width: 60.0 },
    Coluna { header: "Endereço Secundário (Consulta Detalhada)", width: 60.0 },
    Coluna { header: "Status Consulta CPF", width: 16.0 },
    Coluna { header: "Detalhes Consulta CPF", width: 60.0 },
];

static ESPACOS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static VIRGULAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s*,\s*){2,}").expect("valid regex"));
static HIFENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\s*-\s*){2,}").expect("valid regex"));

/// CPF holder found among a company's current relationships.
#[derive(Debug, Clone, PartialEq)]
pub struct Socio {
    pub cpf: String,
    pub nome: String,
    pub tipo: String,
    pub relacionamento: String,
}

/// Contact data from the `registration_data` dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Contato {
    pub nome: String,
    pub nascimento: String,
    pub email_principal: String,
    pub email_secundario: String,
    pub telefone_principal: String,
    pub telefone_secundario: String,
    pub endereco_principal: String,
    pub endereco_secundario: String,
}

impl Default for Contato {
    fn default() -> Self {
        Self {
            nome: NA.into(),
            nascimento: NA.into(),
            email_principal: NA.into(),
            email_secundario: NA.into(),
            telefone_principal: NA.into(),
            telefone_secundario: NA.into(),
            endereco_principal: NA.into(),
            endereco_secundario: NA.into(),
        }
    }
}

/// One line of the output sheet.
#[derive(Debug, Clone)]
pub struct LinhaMassa {
    pub cnpj_original: String,
    pub razao_social: String,
    pub socio: Option<Socio>,
    pub contato: Contato,
    pub status: String,
    pub detalhes: String,
}

impl LinhaMassa {
    /// Line without a partner (invalid CNPJ, failed lookup, nobody qualifying).
    pub fn sem_socio(cnpj_original: &str, razao_social: &str, status: &str, detalhes: impl Into<String>) -> Self {
        Self {
            cnpj_original: cnpj_original.to_string(),
            razao_social: razao_social.to_string(),
            socio: None,
            contato: Contato::default(),
            status: status.to_string(),
            detalhes: detalhes.into(),
        }
    }

    pub fn valores(&self) -> Vec<String> {
        let (cpf, nome, tipo, relacionamento) = match &self.socio {
            Some(s) => (s.cpf.clone(), s.nome.clone(), s.tipo.clone(), s.relacionamento.clone()),
            None => (NA.into(), NA.into(), NA.into(), NA.into()),
        };
        let c = &self.contato;
        vec![
            self.cnpj_original.clone(),
            self.razao_social.clone(),
            cpf,
            nome,
            tipo,
            relacionamento,
            c.nome.clone(),
            c.nascimento.clone(),
            c.email_principal.clone(),
            c.email_secundario.clone(),
            c.telefone_principal.clone(),
            c.telefone_secundario.clone(),
            c.endereco_principal.clone(),
            c.endereco_secundario.clone(),
            self.status.clone(),
            self.detalhes.clone(),
        ]
    }
}

fn ou_na(valor: Option<&Value>) -> String {
    match valor {
        None | Some(Value::Null) => NA.to_string(),
        other => texto(other),
    }
}

/// `ownership` -> `Ownership`.
fn capitalizar(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Partners with an 11-digit CPF among `Result[0].Relationships.CurrentRelationships`.
pub fn socios(relacionamentos: &Value) -> Vec<Socio> {
    let Some(lista) = relacionamentos
        .pointer("/Result/0/Relationships/CurrentRelationships")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    lista
        .iter()
        .filter_map(|rel| {
            let tipo = rel.get("RelationshipType")?.as_str()?;
            if !TIPOS_SOCIO.contains(&tipo.to_uppercase().as_str()) {
                return None;
            }
            let tipo_doc = rel.get("RelatedEntityTaxIdType")?.as_str()?;
            if !tipo_doc.eq_ignore_ascii_case("CPF") {
                return None;
            }
            let cpf = only_digits(rel.get("RelatedEntityTaxIdNumber")?.as_str()?);
            if cpf.len() != 11 {
                return None;
            }
            Some(Socio {
                cpf,
                nome: ou_na(rel.get("RelatedEntityName")),
                tipo: capitalizar(tipo),
                relacionamento: ou_na(rel.get("RelationshipName")),
            })
        })
        .collect()
}

/// `+CC (AA) NUMBER`, or `N/A` when every part is missing.
pub fn formatar_telefone(telefone: &Value) -> String {
    let formatado = format!(
        "+{} ({}) {}",
        texto(telefone.get("CountryCode")),
        texto(telefone.get("AreaCode")),
        texto(telefone.get("Number"))
    );
    let formatado = formatado.trim();
    if formatado == "+ ()" {
        NA.to_string()
    } else {
        formatado.to_string()
    }
}

/// Single-line address with collapsed whitespace and separators.
pub fn formatar_endereco(endereco: &Value) -> String {
    let campo = |nome: &str| texto(endereco.get(nome));
    let bruto = format!(
        "{} {}, {} {} - {}, {}/{} - {}",
        campo("Typology"),
        campo("AddressMain"),
        campo("Number"),
        campo("Complement"),
        campo("Neighborhood"),
        campo("City"),
        campo("State"),
        campo("ZipCode"),
    );
    let limpo = ESPACOS.replace_all(bruto.trim(), " ");
    let limpo = VIRGULAS.replace_all(&limpo, ", ");
    let limpo = HIFENS.replace_all(&limpo, " - ");
    let limpo = limpo.trim();
    if limpo == ", - , / -" {
        NA.to_string()
    } else {
        limpo.to_string()
    }
}

/// `dd/mm/yyyy` for ISO dates; anything unparseable is kept as is.
pub fn formatar_nascimento(bruto: &str) -> String {
    let data = bruto.split('T').next().unwrap_or_default().trim();
    match NaiveDate::parse_from_str(data, "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => bruto.to_string(),
    }
}

/// Contact fields from a `registration_data` response, `None` when `Result` is empty.
pub fn contato(resposta: &Value) -> Option<Contato> {
    let entrada = resposta.pointer("/Result/0")?;
    let registro = entrada.get("RegistrationData").unwrap_or(&Value::Null);
    let basic = registro.get("BasicData").unwrap_or(&Value::Null);
    let emails = registro.get("Emails").unwrap_or(&Value::Null);
    let telefones = registro.get("Phones").unwrap_or(&Value::Null);
    let enderecos = registro.get("Addresses").unwrap_or(&Value::Null);

    let mut contato = Contato {
        nome: ou_na(basic.get("Name")),
        ..Contato::default()
    };
    if let Some(nascimento) = basic.get("BirthDate").and_then(Value::as_str) {
        contato.nascimento = formatar_nascimento(nascimento);
    }
    if let Some(email) = emails.get("Primary") {
        contato.email_principal = ou_na(email.get("EmailAddress"));
    }
    if let Some(email) = emails.get("Secondary") {
        contato.email_secundario = ou_na(email.get("EmailAddress"));
    }
    if let Some(telefone) = telefones.get("Primary") {
        contato.telefone_principal = formatar_telefone(telefone);
    }
    if let Some(telefone) = telefones.get("Secondary") {
        contato.telefone_secundario = formatar_telefone(telefone);
    }
    if let Some(endereco) = enderecos.get("Primary") {
        contato.endereco_principal = formatar_endereco(endereco);
    }
    if let Some(endereco) = enderecos.get("Secondary") {
        contato.endereco_secundario = formatar_endereco(endereco);
    }
    Some(contato)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_cpf_partners_of_known_types_are_kept() {
        let resposta = json!({"Result": [{"Relationships": {"CurrentRelationships": [
            {"RelationshipType": "QSA", "RelatedEntityTaxIdType": "CPF",
             "RelatedEntityTaxIdNumber": "123.456.789-09", "RelatedEntityName": "ANA",
             "RelationshipName": "Sócio-Administrador"},
            {"RelationshipType": "ownership", "RelatedEntityTaxIdType": "cpf",
             "RelatedEntityTaxIdNumber": "98765432100"},
            {"RelationshipType": "QSA", "RelatedEntityTaxIdType": "CNPJ",
             "RelatedEntityTaxIdNumber": "33647553000190"},
            {"RelationshipType": "EMPLOYMENT", "RelatedEntityTaxIdType": "CPF",
             "RelatedEntityTaxIdNumber": "11122233344"},
            {"RelationshipType": "QSA", "RelatedEntityTaxIdType": "CPF",
             "RelatedEntityTaxIdNumber": "123"}
        ]}}]});

        let socios = socios(&resposta);
        assert_eq!(socios.len(), 2);
        assert_eq!(socios[0].cpf, "12345678909");
        assert_eq!(socios[0].tipo, "Qsa");
        assert_eq!(socios[0].relacionamento, "Sócio-Administrador");
        assert_eq!(socios[1].tipo, "Ownership");
        assert_eq!(socios[1].nome, NA);
    }

    #[test]
    fn missing_relationships_yield_nobody() {
        assert!(socios(&json!({"Result": []})).is_empty());
        assert!(socios(&json!({})).is_empty());
    }

    #[test]
    fn phones_are_formatted() {
        let telefone = json!({"CountryCode": 55, "AreaCode": "11", "Number": "999998888"});
        assert_eq!(formatar_telefone(&telefone), "+55 (11) 999998888");
        assert_eq!(formatar_telefone(&json!({})), NA);
    }

    #[test]
    fn addresses_are_normalised() {
        let endereco = json!({
            "Typology": "RUA", "AddressMain": "DAS FLORES", "Number": "10",
            "Complement": "", "Neighborhood": "CENTRO", "City": "CAMPINAS",
            "State": "SP", "ZipCode": "13000000"
        });
        assert_eq!(
            formatar_endereco(&endereco),
            "RUA DAS FLORES, 10 - CENTRO, CAMPINAS/SP - 13000000"
        );
        assert_eq!(formatar_endereco(&json!({})), NA);
    }

    #[test]
    fn birth_dates_use_brazilian_format() {
        assert_eq!(formatar_nascimento("1980-05-12T00:00:00Z"), "12/05/1980");
        assert_eq!(formatar_nascimento("1980-05-12"), "12/05/1980");
        assert_eq!(formatar_nascimento("desconhecida"), "desconhecida");
    }

    #[test]
    fn contact_reads_registration_data() {
        let resposta = json!({"Result": [{"RegistrationData": {
            "BasicData": {"Name": "ANA", "BirthDate": "1990-01-31T00:00:00"},
            "Emails": {"Primary": {"EmailAddress": "ana@x.com"}},
            "Phones": {"Primary": {"CountryCode": "55", "AreaCode": "19", "Number": "33334444"}}
        }}]});
        let c = contato(&resposta).unwrap();
        assert_eq!(c.nome, "ANA");
        assert_eq!(c.nascimento, "31/01/1990");
        assert_eq!(c.email_principal, "ana@x.com");
        assert_eq!(c.email_secundario, NA);
        assert_eq!(c.telefone_principal, "+55 (19) 33334444");
        assert_eq!(c.endereco_principal, NA);

        assert!(contato(&json!({"Result": []})).is_none());
    }

    #[test]
    fn line_values_follow_the_columns() {
        let linha = LinhaMassa::sem_socio("x", NA, "Aviso", "nada");
        let valores = linha.valores();
        assert_eq!(valores.len(), COLUNAS.len());
        assert_eq!(valores[14], "Aviso");
        assert_eq!(valores[2], NA);
    }
}
