use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dashboard::money::Moeda;
use crate::error::{ReportError, Result};

/// Longest range accepted by the date-range selector, in days.
pub const MAX_RANGE_DAYS: i64 = 365;

pub const MAX_PRECISION: u8 = 4;

const MESES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Entidade {
    #[default]
    #[serde(rename = "consolidado", alias = "consolidated")]
    Consolidado,
    #[serde(rename = "individual")]
    Individual,
    #[serde(rename = "filial-1", alias = "branch1")]
    Filial1,
    #[serde(rename = "filial-2", alias = "branch2")]
    Filial2,
}

impl Entidade {
    pub fn label(self) -> &'static str {
        match self {
            Entidade::Consolidado => "Consolidado",
            Entidade::Individual => "Individual",
            Entidade::Filial1 => "Filial 1",
            Entidade::Filial2 => "Filial 2",
        }
    }
}

impl FromStr for Entidade {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "consolidado" | "consolidated" => Ok(Entidade::Consolidado),
            "individual" => Ok(Entidade::Individual),
            "filial-1" | "filial1" | "branch1" => Ok(Entidade::Filial1),
            "filial-2" | "filial2" | "branch2" => Ok(Entidade::Filial2),
            _ => Err(ReportError::InvalidFilter(format!("unknown entity '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cenario {
    #[default]
    #[serde(rename = "real")]
    Real,
    #[serde(rename = "orcado", alias = "budgeted")]
    Orcado,
    #[serde(rename = "forecast")]
    Forecast,
    #[serde(rename = "projetado", alias = "projected")]
    Projetado,
    #[serde(rename = "realizado", alias = "realized")]
    Realizado,
}

impl Cenario {
    pub fn label(self) -> &'static str {
        match self {
            Cenario::Real => "Real",
            Cenario::Orcado => "Orçado",
            Cenario::Forecast => "Forecast",
            Cenario::Projetado => "Projetado",
            Cenario::Realizado => "Realizado",
        }
    }
}

impl FromStr for Cenario {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "real" => Ok(Cenario::Real),
            "orcado" | "orçado" | "budgeted" => Ok(Cenario::Orcado),
            "forecast" => Ok(Cenario::Forecast),
            "projetado" | "projected" => Ok(Cenario::Projetado),
            "realizado" | "realized" => Ok(Cenario::Realizado),
            _ => Err(ReportError::InvalidFilter(format!("unknown scenario '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TipoPeriodo {
    #[default]
    #[serde(rename = "mes", alias = "month")]
    Mes,
    #[serde(rename = "intervalo", alias = "range")]
    Intervalo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Comparacao {
    #[default]
    #[serde(rename = "mes-anterior", alias = "prior-month")]
    MesAnterior,
    #[serde(rename = "ano-anterior", alias = "prior-year")]
    AnoAnterior,
    #[serde(rename = "periodo-anterior", alias = "prior-period")]
    PeriodoAnterior,
    #[serde(rename = "orcado", alias = "vs-budget")]
    Orcado,
    #[serde(rename = "forecast", alias = "vs-forecast")]
    Forecast,
}

impl Comparacao {
    /// Comparison bases offered for each period mode, first entry is the fallback.
    pub fn options_for(tipo: TipoPeriodo) -> &'static [Comparacao] {
        match tipo {
            TipoPeriodo::Mes => &[
                Comparacao::MesAnterior,
                Comparacao::AnoAnterior,
                Comparacao::Orcado,
                Comparacao::Forecast,
            ],
            TipoPeriodo::Intervalo => &[
                Comparacao::PeriodoAnterior,
                Comparacao::AnoAnterior,
                Comparacao::Orcado,
            ],
        }
    }

    pub fn is_valid_for(self, tipo: TipoPeriodo) -> bool {
        Self::options_for(tipo).contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Comparacao::MesAnterior => "Mês Anterior",
            Comparacao::AnoAnterior => "Ano Anterior",
            Comparacao::PeriodoAnterior => "Período Anterior",
            Comparacao::Orcado => "Orçado",
            Comparacao::Forecast => "Forecast",
        }
    }
}

impl FromStr for Comparacao {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mes-anterior" | "prior-month" => Ok(Comparacao::MesAnterior),
            "ano-anterior" | "prior-year" => Ok(Comparacao::AnoAnterior),
            "periodo-anterior" | "prior-period" => Ok(Comparacao::PeriodoAnterior),
            "orcado" | "vs-budget" => Ok(Comparacao::Orcado),
            "forecast" | "vs-forecast" => Ok(Comparacao::Forecast),
            _ => Err(ReportError::InvalidFilter(format!(
                "unknown comparison '{s}'"
            ))),
        }
    }
}

/// A single reporting month, written `dezembro-2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Periodo {
    month: u32,
    year: i32,
}

impl Periodo {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::InvalidPeriod(format!("{month}-{year}")));
        }
        Ok(Self { month, year })
    }

    pub fn current() -> Self {
        let today = Local::now();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    fn month_name(&self) -> &'static str {
        MESES[(self.month - 1) as usize]
    }

    /// `Dezembro/2024`
    pub fn label(&self) -> String {
        let name = self.month_name();
        let mut chars = name.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}/{}", capitalized, self.year)
    }
}

impl fmt::Display for Periodo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.month_name(), self.year)
    }
}

impl FromStr for Periodo {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidPeriod(s.to_string());

        let (name, year) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let name = name.to_lowercase();
        let name = if name == "marco" { "março".to_string() } else { name };

        let month = MESES
            .iter()
            .position(|m| *m == name)
            .ok_or_else(invalid)?;

        Self::new(month as u32 + 1, year)
    }
}

impl TryFrom<String> for Periodo {
    type Error = ReportError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Periodo> for String {
    fn from(value: Periodo) -> Self {
        value.to_string()
    }
}

/// The reporting context selected on the dashboard.
///
/// Exactly one period form is populated at a time: either `periodo`
/// (month mode) or `periodoInicial`/`periodoFinal` (range mode). The
/// setters keep that invariant; deserialized values should be checked with
/// [`FilterState::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    entidade: Entidade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    centro_custo: Option<String>,
    pub cenario: Cenario,
    #[serde(default)]
    periodo: Option<Periodo>,
    #[serde(default)]
    periodo_inicial: Option<NaiveDate>,
    #[serde(default)]
    periodo_final: Option<NaiveDate>,
    comparacao: Comparacao,
    pub moeda: Moeda,
    precisao: u8,
    tipo_periodo: TipoPeriodo,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::for_month(Periodo::current())
    }
}

impl FilterState {
    pub fn for_month(periodo: Periodo) -> Self {
        Self {
            entidade: Entidade::Consolidado,
            centro_custo: None,
            cenario: Cenario::Real,
            periodo: Some(periodo),
            periodo_inicial: None,
            periodo_final: None,
            comparacao: Comparacao::MesAnterior,
            moeda: Moeda::Brl,
            precisao: 2,
            tipo_periodo: TipoPeriodo::Mes,
        }
    }

    pub fn entidade(&self) -> Entidade {
        self.entidade
    }

    pub fn centro_custo(&self) -> Option<&str> {
        self.centro_custo.as_deref()
    }

    pub fn periodo(&self) -> Option<Periodo> {
        self.periodo
    }

    pub fn periodo_inicial(&self) -> Option<NaiveDate> {
        self.periodo_inicial
    }

    pub fn periodo_final(&self) -> Option<NaiveDate> {
        self.periodo_final
    }

    pub fn comparacao(&self) -> Comparacao {
        self.comparacao
    }

    pub fn tipo_periodo(&self) -> TipoPeriodo {
        self.tipo_periodo
    }

    /// Decimal places used for amounts, 0 to 4.
    pub fn precisao(&self) -> u8 {
        self.precisao
    }

    pub fn set_entidade(&mut self, entidade: Entidade) {
        self.entidade = entidade;
        if entidade == Entidade::Consolidado {
            self.centro_custo = None;
        }
    }

    pub fn set_centro_custo(&mut self, centro_custo: Option<String>) -> Result<()> {
        if centro_custo.is_some() && self.entidade == Entidade::Consolidado {
            return Err(ReportError::CostCenterUnavailable);
        }
        self.centro_custo = centro_custo;
        Ok(())
    }

    /// Switch to month mode, clearing any range selection.
    pub fn set_periodo(&mut self, periodo: Periodo) {
        self.periodo = Some(periodo);
        self.periodo_inicial = None;
        self.periodo_final = None;
        self.switch_mode(TipoPeriodo::Mes);
    }

    /// Switch to range mode, clearing the single-month selection.
    ///
    /// The range must start before it ends and span at most
    /// [`MAX_RANGE_DAYS`] days; on error the state is left untouched.
    pub fn set_intervalo(&mut self, inicio: NaiveDate, fim: NaiveDate) -> Result<()> {
        check_range(inicio, fim)?;

        self.periodo = None;
        self.periodo_inicial = Some(inicio);
        self.periodo_final = Some(fim);
        self.switch_mode(TipoPeriodo::Intervalo);
        Ok(())
    }

    pub fn set_comparacao(&mut self, comparacao: Comparacao) -> Result<()> {
        if !comparacao.is_valid_for(self.tipo_periodo) {
            return Err(ReportError::InvalidFilter(format!(
                "comparison '{}' is not available in {} mode",
                comparacao.label(),
                match self.tipo_periodo {
                    TipoPeriodo::Mes => "month",
                    TipoPeriodo::Intervalo => "range",
                }
            )));
        }
        self.comparacao = comparacao;
        Ok(())
    }

    pub fn set_precisao(&mut self, precisao: u8) -> Result<()> {
        if precisao > MAX_PRECISION {
            return Err(ReportError::InvalidFilter(format!(
                "precision must be between 0 and {MAX_PRECISION}"
            )));
        }
        self.precisao = precisao;
        Ok(())
    }

    fn switch_mode(&mut self, tipo: TipoPeriodo) {
        self.tipo_periodo = tipo;
        if !self.comparacao.is_valid_for(tipo) {
            let fallback = Comparacao::options_for(tipo)[0];
            log::debug!(
                "comparison {:?} invalid for {:?}, resetting to {:?}",
                self.comparacao,
                tipo,
                fallback
            );
            self.comparacao = fallback;
        }
    }

    /// Check the invariants the setters maintain, for externally supplied state.
    pub fn validate(&self) -> Result<()> {
        match self.tipo_periodo {
            TipoPeriodo::Mes => {
                if self.periodo.is_none() {
                    return Err(ReportError::InvalidFilter(
                        "month mode requires 'periodo'".to_string(),
                    ));
                }
                if self.periodo_inicial.is_some() || self.periodo_final.is_some() {
                    return Err(ReportError::InvalidFilter(
                        "'periodo' and a date range cannot be set together".to_string(),
                    ));
                }
            }
            TipoPeriodo::Intervalo => {
                if self.periodo.is_some() {
                    return Err(ReportError::InvalidFilter(
                        "'periodo' and a date range cannot be set together".to_string(),
                    ));
                }
                match (self.periodo_inicial, self.periodo_final) {
                    (Some(inicio), Some(fim)) => check_range(inicio, fim)?,
                    _ => {
                        return Err(ReportError::InvalidFilter(
                            "range mode requires 'periodoInicial' and 'periodoFinal'"
                                .to_string(),
                        ))
                    }
                }
            }
        }

        if !self.comparacao.is_valid_for(self.tipo_periodo) {
            return Err(ReportError::InvalidFilter(format!(
                "comparison '{}' is not valid for the current period mode",
                self.comparacao.label()
            )));
        }

        if self.centro_custo.is_some() && self.entidade == Entidade::Consolidado {
            return Err(ReportError::CostCenterUnavailable);
        }

        if self.precisao > MAX_PRECISION {
            return Err(ReportError::InvalidFilter(format!(
                "precision must be between 0 and {MAX_PRECISION}"
            )));
        }

        Ok(())
    }

    /// `Dezembro/2024` or `01/01/2024 a 30/06/2024`
    pub fn periodo_label(&self) -> String {
        match (self.periodo, self.periodo_inicial, self.periodo_final) {
            (Some(periodo), _, _) => periodo.label(),
            (None, Some(inicio), Some(fim)) => format!(
                "{} a {}",
                inicio.format("%d/%m/%Y"),
                fim.format("%d/%m/%Y")
            ),
            _ => "-".to_string(),
        }
    }

    /// Stable text key of every field that shapes the figures.
    pub fn fingerprint(&self) -> String {
        let periodo = match (self.periodo, self.periodo_inicial, self.periodo_final) {
            (Some(periodo), _, _) => periodo.to_string(),
            (None, Some(inicio), Some(fim)) => format!("{inicio}:{fim}"),
            _ => String::new(),
        };
        format!(
            "{:?}|{}|{:?}|{}|{:?}",
            self.entidade,
            self.centro_custo.as_deref().unwrap_or(""),
            self.cenario,
            periodo,
            self.comparacao
        )
    }
}

fn check_range(inicio: NaiveDate, fim: NaiveDate) -> Result<()> {
    if inicio >= fim {
        return Err(ReportError::InvalidDateRange(format!(
            "start date {inicio} must be before end date {fim}"
        )));
    }
    let days = (fim - inicio).num_days();
    if days > MAX_RANGE_DAYS {
        return Err(ReportError::InvalidDateRange(format!(
            "range spans {days} days (maximum is {MAX_RANGE_DAYS})"
        )));
    }
    Ok(())
}
