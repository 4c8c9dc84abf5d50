//! Business logic behind the handlers.

pub mod agenda;
pub mod auth;
pub mod comercial;
pub mod consulta;
pub mod cotacao;
pub mod seguros;

use serde_json::Value;
use uuid::Uuid;

use common::errors::AppResult;
use common::middleware::AuthUser;
use common::models::{ConsultaResultado, OrigemConsulta};

use crate::repository::{HistoricoRepository, NovoHistorico};

pub use agenda::{AgendaService, AgendaServiceTrait};
pub use auth::{AuthService, AuthServiceTrait};
pub use comercial::ComercialService;
pub use consulta::{ConsultaService, ConsultaServiceTrait};
pub use cotacao::CotacaoService;
pub use seguros::SegurosService;

/// One successful lookup, ready to be recorded.
pub(crate) struct Registro<'a> {
    pub tipo_consulta: &'a str,
    pub parametro: String,
    pub origem: OrigemConsulta,
    pub lote_id: Option<Uuid>,
    pub resultado: Value,
    pub mensagem: &'a str,
}

/// Writes the history row and builds the lookup payload.
pub(crate) async fn registrar(
    historico: &dyn HistoricoRepository,
    user: &AuthUser,
    registro: Registro<'_>,
) -> AppResult<ConsultaResultado> {
    let item = historico
        .insert(NovoHistorico {
            usuario: Some(user.user_id()),
            usuario_email: Some(user.email().to_string()),
            tipo_consulta: registro.tipo_consulta.to_string(),
            parametro_consulta: registro.parametro,
            origem: registro.origem,
            resultado: Some(registro.resultado.clone()),
            lote_id: registro.lote_id,
        })
        .await?;

    tracing::info!(
        historico_id = item.id,
        user_id = user.user_id(),
        tipo = registro.tipo_consulta,
        origem = registro.origem.as_str(),
        "consulta registrada"
    );

    Ok(ConsultaResultado {
        mensagem: registro.mensagem.to_string(),
        resultado_api: registro.resultado,
        historico_salvo: item,
        origem: registro.origem,
    })
}
