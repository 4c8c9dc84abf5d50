//! Models shared across services.

pub mod consulta;
pub mod usuario;

pub use consulta::{
    ConsultaRequest, ConsultaResultado, HistoricoItem, OrigemConsulta, PageParams, TipoConsulta,
};
pub use usuario::{NivelAcesso, UsuarioResumo};
