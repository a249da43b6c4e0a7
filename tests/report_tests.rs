use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::TempDir;

use dre_reports::config::{Company, Signatory};
use dre_reports::dashboard::{
    CompositionItem, DashboardData, FilterState, Metric, Periodo, Snapshot, Trend, TrendItem,
};
use dre_reports::export::{ExportRequest, ExportState, Exporter};
use dre_reports::pdf::layout::{DrawOp, PLAIN_FILL, STRIPE_FILL};
use dre_reports::pdf::render_pdf;
use dre_reports::render::{self, csv as csv_report, excel, txt, xml, Rendered};
use dre_reports::report::{build_document, Block, ExportFormat, ReportOptions, TEMPLATES};
use dre_reports::ReportError;

fn metric(value: &str, change: &str) -> Metric {
    Metric {
        value: value.to_string(),
        change: change.to_string(),
        trend: if change.starts_with('-') {
            Trend::Down
        } else {
            Trend::Up
        },
    }
}

fn slice(name: &str, value: f64, percentage: &str, amount: &str) -> CompositionItem {
    CompositionItem {
        name: name.to_string(),
        value,
        color: "#2563eb".to_string(),
        percentage: percentage.to_string(),
        amount: amount.to_string(),
    }
}

fn fixture_data() -> DashboardData {
    DashboardData {
        receita: metric("R$ 2.450.000,00", "+12,5%"),
        lucro: metric("R$ 289.100,00", "+8,2%"),
        ebitda: metric("R$ 453.250,00", "+10,1%"),
        margem_bruta: metric("42,0%", "+1,2%"),
        margem_ebitda: metric("18,5%", "-0,4%"),
        margem_liquida: metric("11,8%", "+0,6%"),
        roe: metric("15,6%", "+2,1%"),
        revenue_composition: vec![
            slice("Vendas de Produtos", 65.0, "65,0%", "R$ 1.592.500,00"),
            slice("Prestação de Serviços", 25.0, "25,0%", "R$ 612.500,00"),
            slice("Outras Receitas", 10.0, "10,0%", "R$ 245.000,00"),
        ],
        expense_distribution: vec![
            slice("Pessoal", 45.0, "45,0%", "R$ 259.087,50"),
            slice("Administrativas", 30.0, "30,0%", "R$ 172.725,00"),
            slice("Comerciais", 25.0, "25,0%", "R$ 143.937,50"),
        ],
        trends: vec![
            TrendItem {
                name: "Receita".to_string(),
                change: "+12,5%".to_string(),
                trend: Trend::Up,
            },
            TrendItem {
                name: "Custos".to_string(),
                change: "-2,3%".to_string(),
                trend: Trend::Down,
            },
        ],
    }
}

fn fixture_company() -> Company {
    Company {
        name: "Empresa Demonstração S.A.".to_string(),
        cnpj: Some("12.345.678/0001-90".to_string()),
        signatories: vec![Signatory {
            name: "Ana Ribeiro".to_string(),
            role: "Diretora Financeira".to_string(),
        }],
    }
}

fn fixture() -> Snapshot {
    let filters = FilterState::for_month(Periodo::new(12, 2024).unwrap());
    let generated_at = NaiveDate::from_ymd_opt(2024, 12, 31)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    Snapshot::new(fixture_company(), fixture_data(), filters).at(generated_at)
}

fn options(formato: ExportFormat) -> ReportOptions {
    ReportOptions {
        formato,
        ..ReportOptions::default()
    }
}

fn assert_well_formed(xml: &str) {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0i32;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML at {}: {e}", reader.buffer_position()),
        }
    }
    assert_eq!(depth, 0);
}

#[test]
fn test_rendering_is_deterministic() {
    let snapshot = fixture();
    for format in ExportFormat::ALL {
        let opts = options(format);
        for template in &TEMPLATES {
            // xlsx bytes carry a creation timestamp; compare the sheet model
            if format == ExportFormat::Xlsx {
                let first = excel::generate(template.id, &snapshot, &opts);
                assert_eq!(first, excel::generate(template.id, &snapshot, &opts));
                continue;
            }
            let first = render::render(template.id, &snapshot, &opts).unwrap();
            let second = render::render(template.id, &snapshot, &opts).unwrap();
            assert_eq!(first, second, "{} as {format}", template.id);
        }
    }
}

#[test]
fn test_xml_is_well_formed_for_every_template() {
    let snapshot = fixture();
    let opts = ReportOptions {
        incluir_assinatura: true,
        ..options(ExportFormat::Xml)
    };
    for template in &TEMPLATES {
        let out = xml::generate(template.id, &snapshot, &opts).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains(&format!("<relatorio template=\"{}\">", template.id)));
        assert_well_formed(&out);
    }
}

#[test]
fn test_xml_escapes_special_characters() {
    let mut snapshot = fixture();
    snapshot.company.name = "Silva & Filhos <Ltda>".to_string();

    let out = xml::generate("dre-gerencial", &snapshot, &options(ExportFormat::Xml)).unwrap();
    assert!(out.contains("Silva &amp; Filhos &lt;Ltda&gt;"));
    assert!(!out.contains("Silva & Filhos"));
    assert_well_formed(&out);
}

#[test]
fn test_csv_dre_table_end_to_end() {
    let out = csv_report::generate("dre-gerencial", &fixture(), &options(ExportFormat::Csv)).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "DRE Gerencial");
    assert!(lines.contains(&"Conta,Valor Atual,Período Anterior,Variação %,% Receita"));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("RECEITA LÍQUIDA,\"R$ 2.450.000,00\",")));
}

fn csv_records(out: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(out.as_bytes());
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_csv_table_rows_match_header_width() {
    let snapshot = fixture();
    for template in &TEMPLATES {
        for incluir_comparacao in [true, false] {
            let opts = ReportOptions {
                incluir_comparacao,
                ..options(ExportFormat::Csv)
            };
            let document = build_document(template.id, &snapshot, &opts);
            let records = csv_records(&csv_report::render(&document).unwrap());

            let mut cursor = 0;
            for table in document.sections.iter().flat_map(|s| &s.blocks).filter_map(|b| match b {
                Block::Table(table) => Some(table),
                _ => None,
            }) {
                let header = (cursor..records.len().saturating_sub(1))
                    .find(|&i| records[i] == vec![table.title.clone()] && records[i + 1] == table.header)
                    .unwrap_or_else(|| panic!("{}: table '{}' missing", template.id, table.title))
                    + 1;
                let body = &records[header + 1..header + 1 + table.rows.len()];
                for (record, row) in body.iter().zip(&table.rows) {
                    assert_eq!(
                        record.len(),
                        table.header.len(),
                        "{} (comparacao={incluir_comparacao}): '{}'",
                        template.id,
                        table.title
                    );
                    assert_eq!(record, row);
                }
                cursor = header + 1 + table.rows.len();
            }
        }
    }

    let records = csv_records(
        &csv_report::generate("dre-gerencial", &snapshot, &options(ExportFormat::Csv)).unwrap(),
    );
    let header = records.iter().position(|r| r[0] == "Conta").expect("DRE header record");
    let names: Vec<&str> = records[header + 1..header + 7]
        .iter()
        .map(|r| r[0].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "RECEITA LÍQUIDA",
            "(-) CUSTOS DOS PRODUTOS VENDIDOS",
            "LUCRO BRUTO",
            "(-) DESPESAS OPERACIONAIS",
            "EBITDA",
            "LUCRO LÍQUIDO"
        ]
    );
    assert_eq!(records[header + 1][1], "R$ 2.450.000,00");
    assert_eq!(records[header + 6][1], "R$ 289.100,00");
}

#[test]
fn test_unknown_template_falls_back_to_default_report() {
    let snapshot = fixture();

    let csv_out = csv_report::generate("nao-existe", &snapshot, &options(ExportFormat::Csv)).unwrap();
    assert!(csv_out.starts_with("Relatório Financeiro\n"));
    assert!(csv_out.contains("Resumo Financeiro"));
    assert!(csv_out.contains("Receita Líquida,\"R$ 2.450.000,00\","));
    assert!(csv_out.contains("Lucro Líquido,\"R$ 289.100,00\","));
    assert!(csv_out.contains("EBITDA,\"R$ 453.250,00\","));

    let txt_out = txt::generate("nao-existe", &snapshot, &options(ExportFormat::Txt)).unwrap();
    assert!(txt_out.contains("RELATÓRIO FINANCEIRO"));
    assert!(txt_out.contains("Receita Líquida"));

    let xml_out = xml::generate("nao-existe", &snapshot, &options(ExportFormat::Xml)).unwrap();
    assert!(xml_out.contains("<relatorio template=\"default\">"));
    for expected in ["Receita Líquida", "R$ 2.450.000,00", "Lucro Líquido", "R$ 289.100,00", "EBITDA", "R$ 453.250,00"] {
        assert!(xml_out.contains(expected), "missing {expected}");
    }

    let workbook = excel::generate("nao-existe", &snapshot, &options(ExportFormat::Xlsx));
    assert_eq!(workbook.sheets.len(), 1);
    assert_eq!(workbook.sheets[0].name, "Resumo");
}

#[test]
fn test_txt_layout() {
    let out = txt::generate("dre-gerencial", &fixture(), &options(ExportFormat::Txt)).unwrap();
    let banner = "═".repeat(80);

    assert!(out.starts_with(&banner));
    assert!(out.contains("DRE GERENCIAL"));
    assert!(out.contains("■ DEMONSTRATIVO DE RESULTADO"));
    assert!(out.contains("RECEITA LÍQUIDA"));
    assert!(out.contains("█"));
    assert!(out.contains("Documento confidencial"));
}

#[test]
fn test_workbook_sheets() {
    let snapshot = fixture();
    let workbook = excel::generate("dre-gerencial", &snapshot, &options(ExportFormat::Xlsx));
    let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["DRE Resumo", "Composição", "Análise"]);

    let first = workbook.sheet("DRE Resumo").unwrap().text_rows();
    assert_eq!(first[0], vec!["DRE Gerencial"]);
    assert!(first.contains(&vec!["Conta", "Valor Atual", "Período Anterior", "Variação %", "% Receita"]));

    let without_details = excel::generate(
        "dre-gerencial",
        &snapshot,
        &ReportOptions {
            incluir_detalhamento: false,
            ..options(ExportFormat::Xlsx)
        },
    );
    assert_eq!(without_details.sheets.len(), 2);

    let bytes = excel::to_xlsx(&workbook).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_pdf_pagination_and_footer() {
    let opts = options(ExportFormat::Pdf);
    let document = build_document("dre-gerencial", &fixture(), &opts);
    let pdf = render_pdf(&document, &opts);

    // "Análise Gerencial" always starts a new page
    assert!(pdf.page_count() >= 2);
    let total = pdf.page_count();
    for (i, page) in pdf.pages.iter().enumerate() {
        let label = format!("Página {} de {}", i + 1, total);
        assert!(page.texts().any(|t| t == label), "missing '{label}'");
        assert!(page.texts().any(|t| t.contains("Documento confidencial")));
    }

    let fills: Vec<&str> = pdf.pages[0]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { fill, .. } => Some(fill.as_str()),
            _ => None,
        })
        .collect();
    assert!(fills.contains(&STRIPE_FILL));
    assert!(fills.contains(&PLAIN_FILL));
}

#[test]
fn test_pdf_without_footer_has_no_page_numbers() {
    let opts = ReportOptions {
        incluir_rodape: false,
        ..options(ExportFormat::Pdf)
    };
    let document = build_document("resumo-executivo", &fixture(), &opts);
    let pdf = render_pdf(&document, &opts);
    assert!(!pdf.texts().iter().any(|t| t.starts_with("Página")));
}

#[test]
fn test_options_shape_the_report() {
    let snapshot = fixture();

    let no_comparison = csv_report::generate(
        "dre-gerencial",
        &snapshot,
        &ReportOptions {
            incluir_comparacao: false,
            ..options(ExportFormat::Csv)
        },
    )
    .unwrap();
    assert!(no_comparison.contains("Conta,Valor Atual,% Receita"));
    assert!(!no_comparison.contains("Comparação"));

    let signed = xml::generate(
        "dre-gerencial",
        &snapshot,
        &ReportOptions {
            incluir_assinatura: true,
            ..options(ExportFormat::Xml)
        },
    )
    .unwrap();
    assert!(signed.contains("nome=\"Ana Ribeiro\""));

    let bare = xml::generate(
        "dre-gerencial",
        &snapshot,
        &ReportOptions {
            incluir_graficos: false,
            incluir_rodape: false,
            ..options(ExportFormat::Xml)
        },
    )
    .unwrap();
    assert!(!bare.contains("<grafico"));
    assert!(!bare.contains("<rodape>"));
    assert!(!bare.contains("<assinaturas>"));
}

#[test]
fn test_consistency_observations_follow_the_data() {
    let mut snapshot = fixture();
    let opts = options(ExportFormat::Txt);

    let consistent = txt::generate("dre-gerencial", &snapshot, &opts).unwrap();
    assert!(consistent.contains("Nenhuma inconsistência identificada"));

    snapshot.data.margem_liquida.value = "20,0%".to_string();
    let inconsistent = txt::generate("dre-gerencial", &snapshot, &opts).unwrap();
    assert!(inconsistent.contains("Margem líquida informada (20,0%) difere da calculada (11,8%)."));
}

#[test]
fn test_exporter_writes_file_named_after_title() {
    let temp_dir = TempDir::new().unwrap();
    let mut exporter = Exporter::new(temp_dir.path());

    let request = ExportRequest::new("Demonstrativo de Resultado do Exercício", ExportFormat::Csv);
    let outcome = exporter.export(&fixture(), &request).unwrap();

    assert_eq!(outcome.template_id, "dre-gerencial");
    assert_eq!(
        outcome.path,
        temp_dir.path().join("demonstrativo-de-resultado-do-exercício.csv")
    );
    let content = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(content.starts_with("DRE Gerencial\n"));
    assert_eq!(exporter.state(), &ExportState::Idle);
}

#[test]
fn test_exporter_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut exporter = Exporter::new(temp_dir.path().join("out"));

    let request = ExportRequest::new("Relatório Inexistente", ExportFormat::Txt);
    let err = exporter.export(&fixture(), &request).unwrap_err();

    assert!(matches!(err, ReportError::TemplateNotFound(_)));
    assert!(!temp_dir.path().join("out").exists());
    assert_eq!(exporter.state(), &ExportState::Idle);
}

#[test]
fn test_reexport_overwrites_previous_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut exporter = Exporter::new(temp_dir.path());
    let request = ExportRequest::new("DRE Gerencial", ExportFormat::Xml);

    let first = exporter.export(&fixture(), &request).unwrap();
    let mut changed = fixture();
    changed.company.name = "Outra Empresa".to_string();
    let second = exporter.export(&changed, &request).unwrap();

    assert_eq!(first.path, second.path);
    let content = std::fs::read_to_string(&second.path).unwrap();
    assert!(content.contains("Outra Empresa"));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_exporter_keeps_files_inside_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    let mut exporter = Exporter::new(&out);

    let escaping = ExportRequest::new("../escaped", ExportFormat::Csv).template("dre-gerencial");
    let outcome = exporter.export(&fixture(), &escaping).unwrap();
    assert_eq!(outcome.path, out.join("-escaped.csv"));
    assert!(!temp_dir.path().join("escaped.csv").exists());

    let nested = ExportRequest::new("Receitas/Despesas", ExportFormat::Csv).template("dre-gerencial");
    let outcome = exporter.export(&fixture(), &nested).unwrap();
    assert_eq!(outcome.path, out.join("receitas-despesas.csv"));
    assert!(outcome.path.is_file());
}

#[test]
fn test_rendered_text_saves_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.txt");
    Rendered::Text("conteúdo".to_string()).save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "conteúdo");
}
