//! The closed catalog of report templates.
//!
//! Templates are static data looked up by id. Their `sections` list describes
//! what a report contains; the actual section order lives in the per-template
//! builders.

use crate::report::options::{ExportFormat, Orientacao, ReportOptions};

/// Template used when a PDF export cannot resolve its title.
pub const DEFAULT_PDF_TEMPLATE: &str = "dre-gerencial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Tabela,
    Indicadores,
    Grafico,
    Destaques,
    Analise,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Tabela => "tabela",
            SectionKind::Indicadores => "indicadores",
            SectionKind::Grafico => "gráfico",
            SectionKind::Destaques => "destaques",
            SectionKind::Analise => "análise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub title: &'static str,
    pub kind: SectionKind,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub frequency: &'static str,
    pub sections: &'static [SectionSpec],
    pub default_options: ReportOptions,
}

const fn options(comparacao: bool, graficos: bool, detalhamento: bool) -> ReportOptions {
    ReportOptions {
        incluir_comparacao: comparacao,
        incluir_graficos: graficos,
        incluir_detalhamento: detalhamento,
        incluir_assinatura: false,
        incluir_rodape: true,
        formato: ExportFormat::Pdf,
        orientacao: Orientacao::Retrato,
    }
}

const fn section(title: &'static str, kind: SectionKind) -> SectionSpec {
    SectionSpec { title, kind }
}

pub static TEMPLATES: [ReportTemplate; 6] = [
    ReportTemplate {
        id: "dre-gerencial",
        name: "DRE Gerencial",
        description: "Demonstrativo de resultado com análise vertical, destaques e análise gerencial",
        category: "dre",
        frequency: "mensal",
        sections: &[
            section("Demonstrativo de Resultado", SectionKind::Tabela),
            section("Indicadores", SectionKind::Indicadores),
            section("Destaques", SectionKind::Destaques),
            section("Composição", SectionKind::Grafico),
            section("Análise Gerencial", SectionKind::Analise),
        ],
        default_options: options(true, true, true),
    },
    ReportTemplate {
        id: "dre-comparativo",
        name: "DRE Comparativo",
        description: "Resultado do período contra a base de comparação selecionada",
        category: "dre",
        frequency: "mensal",
        sections: &[
            section("Comparativo", SectionKind::Tabela),
            section("Tendências", SectionKind::Tabela),
        ],
        default_options: options(true, false, true),
    },
    ReportTemplate {
        id: "analise-margens",
        name: "Análise de Margens",
        description: "Margens bruta, EBITDA e líquida com retorno sobre o patrimônio",
        category: "analise",
        frequency: "mensal",
        sections: &[
            section("Margens", SectionKind::Tabela),
            section("Gráfico de Margens", SectionKind::Grafico),
            section("Interpretação", SectionKind::Analise),
        ],
        default_options: options(true, true, false),
    },
    ReportTemplate {
        id: "composicao-receitas",
        name: "Composição de Receitas",
        description: "Participação de cada fonte na receita líquida",
        category: "analise",
        frequency: "trimestral",
        sections: &[
            section("Receitas", SectionKind::Tabela),
            section("Participação", SectionKind::Grafico),
        ],
        default_options: options(false, true, true),
    },
    ReportTemplate {
        id: "distribuicao-despesas",
        name: "Distribuição de Despesas",
        description: "Distribuição das despesas operacionais por categoria",
        category: "analise",
        frequency: "trimestral",
        sections: &[
            section("Despesas", SectionKind::Tabela),
            section("Participação", SectionKind::Grafico),
        ],
        default_options: options(false, true, true),
    },
    ReportTemplate {
        id: "resumo-executivo",
        name: "Resumo Executivo",
        description: "Indicadores principais e destaques do período para a diretoria",
        category: "executivo",
        frequency: "mensal",
        sections: &[
            section("Indicadores", SectionKind::Indicadores),
            section("Destaques", SectionKind::Destaques),
            section("Síntese", SectionKind::Analise),
        ],
        default_options: options(true, false, false),
    },
];

/// Dashboard card titles that open a specific template.
const TITLE_ALIASES: [(&str, &str); 6] = [
    ("demonstrativo de resultado do exercício", "dre-gerencial"),
    ("demonstrativo de resultado", "dre-gerencial"),
    ("dre", "dre-gerencial"),
    ("análise comparativa", "dre-comparativo"),
    ("indicadores financeiros", "analise-margens"),
    ("relatório executivo", "resumo-executivo"),
];

pub fn get_template_by_id(id: &str) -> Option<&'static ReportTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn get_templates_by_category(category: &str) -> Vec<&'static ReportTemplate> {
    TEMPLATES.iter().filter(|t| t.category == category).collect()
}

/// Map a report title (template name or dashboard alias) to its template.
pub fn resolve_title(title: &str) -> Option<&'static ReportTemplate> {
    let wanted = title.trim().to_lowercase();

    if let Some(template) = TEMPLATES.iter().find(|t| t.name.to_lowercase() == wanted) {
        return Some(template);
    }

    TITLE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .and_then(|(_, id)| get_template_by_id(id))
}
