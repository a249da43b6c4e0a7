use serde::{Deserialize, Serialize};

use crate::dashboard::Moeda;
use crate::report::Orientacao;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub export: ExportSettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub signatories: Vec<Signatory>,
}

/// A person who signs the report when signatures are enabled
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Signatory {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExportSettings {
    pub output_dir: String,
    #[serde(default)]
    pub moeda: Moeda,
    #[serde(default = "default_precisao")]
    pub precisao: u8,
}

fn default_precisao() -> u8 {
    2
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PdfSettings {
    #[serde(default)]
    pub orientation: Orientacao,
}
