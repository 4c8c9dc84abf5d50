//! Utility functions and helpers.

pub mod documento;
pub mod http;

pub use documento::{normalize_cep, normalize_cnpj, normalize_cpf, only_digits, validate_uf};
