mod company;

pub use company::{Company, Config, ExportSettings, PdfSettings, Signatory};

use crate::error::{ReportError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.dre/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dre") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.dre/
    let home = dirs_home().ok_or_else(|| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".dre"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory; relative paths hang off the config dir
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(ReportError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })
}

/// Path of the default dashboard snapshot written by `dre init`
pub fn snapshot_file(config_dir: &Path) -> PathBuf {
    config_dir.join("snapshot.json")
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Empresa Demonstração S.A."
cnpj = "12.345.678/0001-90"    # optional

# Printed in the signature block (--signature)
[[company.signatories]]
name = "Ana Ribeiro"
role = "Diretora Financeira"

[[company.signatories]]
name = "Carlos Mendes"
role = "Contador CRC 1SP000000/O-0"

[export]
output_dir = "output"   # relative to this directory, or absolute / ~/...
moeda = "BRL"           # BRL, USD or EUR
precisao = 2            # decimal places, 0-4

[pdf]
orientation = "retrato" # retrato or paisagem
"#;
