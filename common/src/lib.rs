//! Shared building blocks for the back-office lookup services.
//!
//! Every service in the workspace depends on this crate for:
//! - configuration loaded from the environment
//! - the `AppError` type and its HTTP rendering
//! - the `ApiResponse` envelope
//! - JWT issuing and verification
//! - request-id and authentication middleware
//! - lookup DTOs shared between services
//! - Brazilian document normalisation (CPF, CNPJ, CEP)

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod telemetry;
pub mod token;
pub mod utils;

pub use errors::{AppError, AppResult};
pub use response::ApiResponse;
