//! Fire-insurance (contents) quote.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::AuthUser;
use common::models::{OrigemConsulta, TipoConsulta};

use crate::repository::{CotacaoRepository, HistoricoRepository, NovaCotacao, NovoHistorico};

/// Gross-up factor for the IOF tax on premiums.
const FATOR_IOF: f64 = 1.0738;
const ASSISTENCIA_BASICA: f64 = 0.2;
const TAXA_RESIDENCIAL: f64 = 0.00250 / 100.0;
const TAXA_COMERCIAL: f64 = 0.00585 / 100.0;
const PREMIO_MINIMO_SEGURADORA: f64 = 0.80;
const REPASSE_SEGURADORA: f64 = 0.57;
const IMPOSTO: f64 = 0.20;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CotacaoEntrada {
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Valor de incêndio conteúdo não pode ser negativo."))]
    pub incendio_conteudo: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Valor de perda de aluguel não pode ser negativo."))]
    pub perda_aluguel: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Repasse deve estar entre 0 e 100."))]
    pub repasse_percentual: f64,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "Prêmio proposto deve ser maior que zero."))]
    pub premio_proposto: f64,
    /// `residencial` or `comercial`; anything else prices as commercial.
    #[serde(default)]
    pub tipo_imovel: String,
    #[serde(default)]
    pub assistencia: String,
}

/// Raw quote figures, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculo {
    pub is_total: f64,
    pub premio_liquido: f64,
    pub repasse: f64,
    pub comissao_administradora: f64,
    pub assistencia_basica: f64,
    pub taxa_seguradora: f64,
    pub premio_liquido_seguradora: f64,
    pub premio_bruto_seguradora: f64,
    pub repasse_seguradora_bruto: f64,
    pub imposto: f64,
    pub repasse_liquido: f64,
    pub entradas: f64,
    pub saidas: f64,
    pub resultado: f64,
    pub percentual: f64,
}

pub fn calcular(entrada: &CotacaoEntrada) -> Calculo {
    let is_total = entrada.incendio_conteudo + entrada.perda_aluguel;
    let premio_liquido = entrada.premio_proposto / FATOR_IOF;
    let repasse = entrada.repasse_percentual / 100.0;
    let comissao_administradora = premio_liquido * repasse;
    let taxa_seguradora = if entrada.tipo_imovel.trim().eq_ignore_ascii_case("residencial") {
        TAXA_RESIDENCIAL
    } else {
        TAXA_COMERCIAL
    };
    let premio_liquido_seguradora = (is_total * taxa_seguradora).max(PREMIO_MINIMO_SEGURADORA);
    let premio_bruto_seguradora = premio_liquido_seguradora * FATOR_IOF;
    let repasse_seguradora_bruto = premio_liquido_seguradora * REPASSE_SEGURADORA;
    let repasse_liquido = repasse_seguradora_bruto * (1.0 - IMPOSTO);
    let entradas = entrada.premio_proposto + repasse_liquido;
    let saidas = comissao_administradora + ASSISTENCIA_BASICA + premio_bruto_seguradora;
    let resultado = entradas - saidas;

    Calculo {
        is_total,
        premio_liquido,
        repasse,
        comissao_administradora,
        assistencia_basica: ASSISTENCIA_BASICA,
        taxa_seguradora,
        premio_liquido_seguradora,
        premio_bruto_seguradora,
        repasse_seguradora_bruto,
        imposto: IMPOSTO,
        repasse_liquido,
        entradas,
        saidas,
        resultado,
        percentual: resultado / entrada.premio_proposto,
    }
}

/// Rounds to `casas` decimals, ties to even on the exact binary value.
fn arredondar(valor: f64, casas: usize) -> f64 {
    format!("{valor:.casas$}").parse().unwrap_or(valor)
}

fn round2(valor: f64) -> f64 {
    arredondar(valor, 2)
}

/// Decimal text that always carries a fractional part (`12` -> `"12.0"`).
fn decimal(valor: f64) -> String {
    let texto = valor.to_string();
    if texto.contains('.') {
        texto
    } else {
        format!("{texto}.0")
    }
}

/// Rate rounded to `casas` decimals, then scaled: `0.125` at 2 -> `"12.0%"`.
fn como_percentual(taxa: f64, casas: usize) -> String {
    format!("{}%", decimal(arredondar(taxa, casas) * 100.0))
}

/// Quote as returned to the caller and stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CotacaoResultado {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub incendio_conteudo: f64,
    pub perda_aluguel: f64,
    pub repasse_percentual: f64,
    pub premio_proposto: f64,
    pub is_total: f64,
    pub premio_liquido: f64,
    pub repasse: String,
    pub comissao_administradora: f64,
    pub assistencia_basica: String,
    pub taxa_seguradora: String,
    pub premio_liquido_seguradora: f64,
    pub premio_bruto_seguradora: f64,
    pub repasse_seguradora_bruto: f64,
    pub imposto: String,
    pub repasse_liquido: f64,
    pub entradas: f64,
    pub saidas: f64,
    pub resultado: f64,
    pub percentual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_cotacao: Option<DateTime<Utc>>,
}

impl CotacaoResultado {
    pub fn new(entrada: &CotacaoEntrada, calculo: &Calculo) -> Self {
        Self {
            id: None,
            incendio_conteudo: round2(entrada.incendio_conteudo),
            perda_aluguel: round2(entrada.perda_aluguel),
            repasse_percentual: round2(entrada.repasse_percentual),
            premio_proposto: round2(entrada.premio_proposto),
            is_total: round2(calculo.is_total),
            premio_liquido: round2(calculo.premio_liquido),
            repasse: como_percentual(calculo.repasse, 2),
            comissao_administradora: round2(calculo.comissao_administradora),
            assistencia_basica: como_percentual(calculo.assistencia_basica, 2),
            taxa_seguradora: como_percentual(calculo.taxa_seguradora, 6),
            premio_liquido_seguradora: round2(calculo.premio_liquido_seguradora),
            premio_bruto_seguradora: round2(calculo.premio_bruto_seguradora),
            repasse_seguradora_bruto: round2(calculo.repasse_seguradora_bruto),
            imposto: como_percentual(calculo.imposto, 2),
            repasse_liquido: round2(calculo.repasse_liquido),
            entradas: round2(calculo.entradas),
            saidas: round2(calculo.saidas),
            resultado: round2(calculo.resultado),
            percentual: como_percentual(calculo.percentual, 2),
            data_cotacao: None,
        }
    }
}

pub struct CotacaoService {
    cotacoes: Arc<dyn CotacaoRepository>,
    historico: Arc<dyn HistoricoRepository>,
}

impl CotacaoService {
    pub fn new(cotacoes: Arc<dyn CotacaoRepository>, historico: Arc<dyn HistoricoRepository>) -> Self {
        Self {
            cotacoes,
            historico,
        }
    }

    /// Prices, stores the quote and records it as an `estudo-incendio` lookup.
    pub async fn incendio_conteudo(
        &self,
        user: &AuthUser,
        entrada: CotacaoEntrada,
    ) -> AppResult<CotacaoResultado> {
        entrada.validate()?;
        let calculo = calcular(&entrada);
        let mut resultado = CotacaoResultado::new(&entrada, &calculo);

        let entrada_json = serde_json::to_value(&entrada)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let resultado_json = serde_json::to_value(&resultado)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let (id, data_cotacao) = self
            .cotacoes
            .insert(NovaCotacao {
                responsavel: user.user_id(),
                entrada: entrada_json.clone(),
                resultado: resultado_json.clone(),
            })
            .await?;
        resultado.id = Some(id);
        resultado.data_cotacao = Some(data_cotacao);

        self.historico
            .insert(NovoHistorico {
                usuario: Some(user.user_id()),
                usuario_email: Some(user.email().to_string()),
                tipo_consulta: TipoConsulta::EstudoIncendio.as_str().to_string(),
                parametro_consulta: entrada_json.to_string(),
                origem: OrigemConsulta::Manual,
                resultado: Some(resultado_json),
                lote_id: None,
            })
            .await?;

        tracing::info!(cotacao_id = id, user_id = user.user_id(), resultado = resultado.resultado, "cotação registrada");
        Ok(resultado)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrada(tipo: &str, conteudo: f64, premio: f64) -> CotacaoEntrada {
        CotacaoEntrada {
            incendio_conteudo: conteudo,
            perda_aluguel: 20_000.0,
            repasse_percentual: 10.0,
            premio_proposto: premio,
            tipo_imovel: tipo.into(),
            assistencia: "basica".into(),
        }
    }

    #[test]
    fn commercial_quote_figures() {
        let e = entrada("comercial", 100_000.0, 50.0);
        let r = CotacaoResultado::new(&e, &calcular(&e));

        assert_eq!(r.is_total, 120_000.0);
        assert_eq!(r.premio_liquido, 46.56);
        assert_eq!(r.comissao_administradora, 4.66);
        assert_eq!(r.premio_liquido_seguradora, 7.02);
        assert_eq!(r.premio_bruto_seguradora, 7.54);
        assert_eq!(r.repasse_seguradora_bruto, 4.0);
        assert_eq!(r.repasse_liquido, 3.2);
        assert_eq!(r.entradas, 53.2);
        assert_eq!(r.saidas, 12.39);
        assert_eq!(r.resultado, 40.81);
        assert_eq!(r.percentual, "82.0%");
        assert_eq!(r.repasse, "10.0%");
        assert_eq!(r.assistencia_basica, "20.0%");
        assert_eq!(r.imposto, "20.0%");
        assert_eq!(r.taxa_seguradora, "0.0058%");
    }

    #[test]
    fn rates_are_rounded_before_scaling() {
        let e = CotacaoEntrada {
            repasse_percentual: 12.5,
            ..entrada("comercial", 100_000.0, 50.0)
        };
        let r = CotacaoResultado::new(&e, &calcular(&e));
        assert_eq!(r.repasse, "12.0%");
        assert_eq!(r.percentual, "79.0%");
        assert_eq!(r.comissao_administradora, 5.82);
        assert_eq!(r.resultado, 39.64);

        let residencial = entrada("residencial", 100_000.0, 50.0);
        let r = CotacaoResultado::new(&residencial, &calcular(&residencial));
        assert_eq!(r.taxa_seguradora, "0.0025%");
        assert_eq!(r.percentual, "87.0%");
    }

    #[test]
    fn fractional_percentages_keep_float_digits() {
        assert_eq!(como_percentual(0.07, 2), "7.000000000000001%");
        assert_eq!(decimal(82.0), "82.0");
        assert_eq!(arredondar(0.125, 2), 0.12);
    }

    #[test]
    fn insurer_premium_has_a_floor() {
        let e = CotacaoEntrada {
            perda_aluguel: 0.0,
            ..entrada("Residencial", 1_000.0, 30.0)
        };
        let c = calcular(&e);
        assert_eq!(c.taxa_seguradora, TAXA_RESIDENCIAL);
        assert_eq!(c.premio_liquido_seguradora, PREMIO_MINIMO_SEGURADORA);
    }

    #[test]
    fn non_positive_premium_is_rejected() {
        assert!(entrada("comercial", 1.0, 0.0).validate().is_err());
        assert!(entrada("comercial", -1.0, 10.0).validate().is_err());
        assert!(entrada("comercial", 1.0, 10.0).validate().is_ok());
    }
}
