mod data;
mod filters;
pub mod money;
pub mod sample;

pub use data::{load_snapshot, CompositionItem, DashboardData, Metric, Trend, TrendItem};
pub use filters::{
    Cenario, Comparacao, Entidade, FilterState, Periodo, TipoPeriodo, MAX_PRECISION,
    MAX_RANGE_DAYS,
};
pub use money::Moeda;

use chrono::NaiveDateTime;

use crate::config::Company;

/// Everything a renderer reads: one data snapshot and the filters it was
/// derived from, frozen at the moment the export starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub company: Company,
    pub data: DashboardData,
    pub filters: FilterState,
    pub generated_at: NaiveDateTime,
}

impl Snapshot {
    pub fn new(company: Company, data: DashboardData, filters: FilterState) -> Self {
        Self {
            company,
            data,
            filters,
            generated_at: chrono::Local::now().naive_local(),
        }
    }

    /// Pin the generation timestamp, mainly so repeated exports compare equal.
    pub fn at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// `19/10/2026 14:30`
    pub fn generated_label(&self) -> String {
        self.generated_at.format("%d/%m/%Y %H:%M").to_string()
    }
}
