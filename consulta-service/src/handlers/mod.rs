//! HTTP handlers.

pub mod agenda;
pub mod auth;
pub mod comercial;
pub mod consultas;
pub mod cotacao;
pub mod health;
pub mod seguros;

pub(crate) const SERVICE: &str = "consulta-service";
