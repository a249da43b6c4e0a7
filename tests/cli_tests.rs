use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn dre_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dre"))
}

/// Run `dre init` in a fresh temp dir and return (temp_dir, config_path)
fn init_config() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dre-config");
    let config = config_path.to_str().unwrap().to_string();

    dre_cmd().args(["-C", &config, "init"]).assert().success();

    (temp_dir, config)
}

fn export_args<'a>(config: &'a str, out: &'a Path, title: &'a str, format: &'a str) -> Vec<&'a str> {
    vec![
        "-C",
        config,
        "export",
        "--title",
        title,
        "--format",
        format,
        "--periodo",
        "dezembro-2024",
        "--output",
        out.to_str().unwrap(),
    ]
}

#[test]
fn test_help() {
    dre_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Income statement (DRE) reports"));
}

#[test]
fn test_version() {
    dre_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dre"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dre-config");

    dre_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized DRE config"));

    // Check files were created
    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("snapshot.json").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args(["-C", &config, "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_export_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    dre_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "export",
            "--title",
            "DRE Gerencial",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_templates_list() {
    dre_cmd()
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("dre-gerencial"))
        .stdout(predicate::str::contains("Resumo Executivo"));
}

#[test]
fn test_templates_by_category() {
    dre_cmd()
        .args(["templates", "--category", "executivo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resumo-executivo"))
        .stdout(predicate::str::contains("dre-comparativo").not());
}

#[test]
fn test_show_indicators() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args(["-C", &config, "show", "--periodo", "dezembro-2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dezembro/2024"))
        .stdout(predicate::str::contains("Receita Líquida"))
        .stdout(predicate::str::contains("R$"));
}

#[test]
fn test_show_uses_snapshot_file() {
    let (_temp_dir, config) = init_config();
    let snapshot = Path::new(&config).join("snapshot.json");

    dre_cmd()
        .args(["-C", &config, "show", "--data", snapshot.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("EBITDA"));
}

#[test]
fn test_export_csv() {
    let (temp_dir, config) = init_config();
    let out = temp_dir.path().join("out");

    dre_cmd()
        .args(export_args(&config, &out, "DRE Gerencial", "csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Relatório exportado"));

    let content = std::fs::read_to_string(out.join("dre-gerencial.csv")).unwrap();
    assert!(content.starts_with("DRE Gerencial\n"));
    assert!(content.contains("Conta,Valor Atual,Período Anterior,Variação %,% Receita"));
    assert!(content.contains("Empresa Demonstração S.A."));
}

#[test]
fn test_export_txt_and_xml() {
    let (temp_dir, config) = init_config();
    let out = temp_dir.path().join("out");

    dre_cmd()
        .args(export_args(&config, &out, "Resumo Executivo", "txt"))
        .assert()
        .success();
    dre_cmd()
        .args(export_args(&config, &out, "Resumo Executivo", "xml"))
        .assert()
        .success();

    let txt = std::fs::read_to_string(out.join("resumo-executivo.txt")).unwrap();
    assert!(txt.contains("RESUMO EXECUTIVO"));

    let xml = std::fs::read_to_string(out.join("resumo-executivo.xml")).unwrap();
    assert!(xml.contains("<relatorio template=\"resumo-executivo\">"));
}

#[test]
fn test_export_xlsx_by_template_id() {
    let (temp_dir, config) = init_config();
    let out = temp_dir.path().join("out");

    dre_cmd()
        .args([
            "-C",
            &config,
            "export",
            "--template",
            "analise-margens",
            "--format",
            "xlsx",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let bytes = std::fs::read(out.join("análise-de-margens.xlsx")).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_export_defaults_to_config_output_dir() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args(["-C", &config, "export", "--title", "DRE", "--format", "txt"])
        .assert()
        .success();

    assert!(Path::new(&config).join("output").join("dre.txt").exists());
}

#[test]
fn test_export_unknown_title_fails_for_csv() {
    let (temp_dir, config) = init_config();
    let out = temp_dir.path().join("out");

    dre_cmd()
        .args(export_args(&config, &out, "Relatório Inexistente", "csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Erro na exportação: Template 'Relatório Inexistente' not found"))
        .stdout(predicate::str::contains("Relatório exportado").not());

    assert!(!out.join("relatório-inexistente.csv").exists());
}

#[test]
fn test_export_unknown_format() {
    let (temp_dir, config) = init_config();
    let out = temp_dir.path().join("out");

    dre_cmd()
        .args(export_args(&config, &out, "DRE Gerencial", "docx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'docx'"));
}

#[test]
fn test_cost_center_requires_entity() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args(["-C", &config, "show", "--centro-custo", "CC-100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cost center"));

    dre_cmd()
        .args([
            "-C",
            &config,
            "show",
            "--entidade",
            "filial-1",
            "--centro-custo",
            "CC-100",
        ])
        .assert()
        .success();
}

#[test]
fn test_invalid_date_range() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args([
            "-C",
            &config,
            "show",
            "--inicio",
            "2024-06-30",
            "--fim",
            "2024-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn test_invalid_period() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args(["-C", &config, "show", "--periodo", "smarch-2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period 'smarch-2024'"));
}

#[test]
fn test_period_and_range_conflict() {
    let (_temp_dir, config) = init_config();

    dre_cmd()
        .args([
            "-C",
            &config,
            "show",
            "--periodo",
            "dezembro-2024",
            "--inicio",
            "2024-01-01",
            "--fim",
            "2024-03-31",
        ])
        .assert()
        .failure();
}
