use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "Alta",
            Trend::Down => "Queda",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

/// A headline indicator as displayed on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

/// One slice of the revenue or expense breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionItem {
    pub name: String,
    /// Share of the total, 0-100.
    pub value: f64,
    pub color: String,
    pub percentage: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendItem {
    pub name: String,
    pub change: String,
    pub trend: Trend,
}

/// Financial snapshot derived from the current filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub receita: Metric,
    pub lucro: Metric,
    pub ebitda: Metric,
    pub margem_bruta: Metric,
    pub margem_ebitda: Metric,
    pub margem_liquida: Metric,
    pub roe: Metric,
    #[serde(default)]
    pub revenue_composition: Vec<CompositionItem>,
    #[serde(default)]
    pub expense_distribution: Vec<CompositionItem>,
    #[serde(default)]
    pub trends: Vec<TrendItem>,
}

impl DashboardData {
    /// The seven headline indicators in display order.
    pub fn indicators(&self) -> [(&'static str, &Metric); 7] {
        [
            ("Receita Líquida", &self.receita),
            ("Lucro Líquido", &self.lucro),
            ("EBITDA", &self.ebitda),
            ("Margem Bruta", &self.margem_bruta),
            ("Margem EBITDA", &self.margem_ebitda),
            ("Margem Líquida", &self.margem_liquida),
            ("ROE", &self.roe),
        ]
    }
}

/// Load a dashboard snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> Result<DashboardData> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ReportError::SnapshotParse {
        path: path.to_path_buf(),
        source: e,
    })
}
