//! Brazilian document normalisation.
//!
//! Inputs may carry the usual punctuation (`123.456.789-00`,
//! `33.647.553/0001-90`, `20000-000`); normalised values are digits only.

use crate::errors::{AppError, AppResult};

/// Keeps only ASCII digits.
pub fn only_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strips the allowed separators and checks the remaining digit count.
fn normalize(raw: &str, separators: &[char], len: usize, message: &str) -> AppResult<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !separators.contains(c))
        .collect();
    if cleaned.len() == len && cleaned.chars().all(|c| c.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(AppError::Validation(message.to_string()))
    }
}

pub fn normalize_cpf(raw: &str) -> AppResult<String> {
    normalize(raw, &['.', '-', ' '], 11, "CPF deve conter 11 dígitos numéricos.")
}

pub fn normalize_cnpj(raw: &str) -> AppResult<String> {
    normalize(raw, &['.', '/', '-', ' '], 14, "CNPJ deve conter 14 dígitos numéricos.")
}

pub fn normalize_cep(raw: &str) -> AppResult<String> {
    normalize(raw, &['-', '.', ' '], 8, "CEP deve conter 8 dígitos numéricos.")
}

/// Two-letter state code, upper-cased.
pub fn validate_uf(raw: &str) -> AppResult<String> {
    let uf = raw.trim();
    if uf.chars().count() == 2 && uf.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(uf.to_ascii_uppercase())
    } else {
        Err(AppError::Validation(
            "O campo 'estado' deve ser a sigla de 2 letras da UF.".to_string(),
        ))
    }
}
