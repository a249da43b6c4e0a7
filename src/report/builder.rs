//! Per-template document builders.
//!
//! Each template id maps to a fixed sequence of sections. Unknown ids
//! produce the minimal default report instead of failing.

use log::debug;

use crate::config::Signatory;
use crate::dashboard::money::{format_currency, format_percent, parse_currency, parse_percent};
use crate::dashboard::{CompositionItem, Metric, Snapshot};
use crate::report::document::{Bar, Block, Callout, Chart, MetricLine, ReportDocument, Section, Table};
use crate::report::options::ReportOptions;
use crate::report::templates::get_template_by_id;

pub const DEFAULT_TEMPLATE_ID: &str = "default";

/// Margin differences up to this many percentage points are rounding noise.
const MARGIN_TOLERANCE: f64 = 0.1;

struct Ctx<'a> {
    snap: &'a Snapshot,
    opts: &'a ReportOptions,
}

impl<'a> Ctx<'a> {
    fn money(&self, amount: f64) -> String {
        format_currency(amount, self.snap.filters.moeda, self.snap.filters.precisao())
    }

    fn receita(&self) -> f64 {
        parse_currency(&self.snap.data.receita.value).unwrap_or(0.0)
    }

    /// Share of net revenue, or `-` when revenue is unknown.
    fn share_of_revenue(&self, amount: f64) -> String {
        let receita = self.receita();
        if receita == 0.0 {
            return "-".to_string();
        }
        format_percent(amount / receita * 100.0, 1)
    }

    /// Value of a money metric in the comparison period, backed out of its change.
    fn prior_amount(&self, metric: &Metric) -> String {
        let (Some(current), Some(change)) = (parse_currency(&metric.value), parse_percent(&metric.change)) else {
            return "-".to_string();
        };
        if change <= -100.0 {
            return "-".to_string();
        }
        self.money(current / (1.0 + change / 100.0))
    }

    fn difference(&self, metric: &Metric) -> String {
        let (Some(current), Some(change)) = (parse_currency(&metric.value), parse_percent(&metric.change)) else {
            return "-".to_string();
        };
        if change <= -100.0 {
            return "-".to_string();
        }
        self.money(current - current / (1.0 + change / 100.0))
    }

    fn comparacao_label(&self) -> &'static str {
        self.snap.filters.comparacao().label()
    }
}

fn metadata(ctx: &Ctx) -> Vec<(String, String)> {
    let snap = ctx.snap;
    let filters = &snap.filters;
    let mut entries = vec![("Empresa".to_string(), snap.company.name.clone())];

    if let Some(cnpj) = &snap.company.cnpj {
        entries.push(("CNPJ".to_string(), cnpj.clone()));
    }
    entries.push(("Entidade".to_string(), filters.entidade().label().to_string()));
    if let Some(centro) = filters.centro_custo() {
        entries.push(("Centro de Custo".to_string(), centro.to_string()));
    }
    entries.push(("Cenário".to_string(), filters.cenario.label().to_string()));
    entries.push(("Período".to_string(), filters.periodo_label()));
    if ctx.opts.incluir_comparacao {
        entries.push(("Comparação".to_string(), ctx.comparacao_label().to_string()));
    }
    entries.push(("Moeda".to_string(), filters.moeda.code().to_string()));
    entries.push(("Gerado em".to_string(), snap.generated_label()));
    entries
}

fn footer(ctx: &Ctx) -> Option<String> {
    ctx.opts.incluir_rodape.then(|| {
        format!(
            "{} • Gerado em {} • Documento confidencial",
            ctx.snap.company.name,
            ctx.snap.generated_label()
        )
    })
}

fn metrics_block(ctx: &Ctx) -> Block {
    let lines = ctx
        .snap
        .data
        .indicators()
        .into_iter()
        .map(|(label, metric)| MetricLine {
            label: label.to_string(),
            value: metric.value.clone(),
            change: if ctx.opts.incluir_comparacao {
                metric.change.clone()
            } else {
                "-".to_string()
            },
            trend: metric.trend,
        })
        .collect();
    Block::Metrics(lines)
}

fn composition_table(title: &str, first_column: &str, items: &[CompositionItem], total: String) -> Table {
    let mut table = Table::new(title, [first_column, "Valor", "Participação"]);
    for item in items {
        table = table.row([item.name.as_str(), item.amount.as_str(), item.percentage.as_str()]);
    }
    table.row(["TOTAL".to_string(), total, format_percent(100.0, 1)])
}

fn composition_chart(title: &str, items: &[CompositionItem]) -> Option<Block> {
    if items.is_empty() {
        return None;
    }
    let bars = items
        .iter()
        .map(|item| Bar {
            label: item.name.clone(),
            share: item.value.clamp(0.0, 100.0),
            display: item.percentage.clone(),
            color: item.color.clone(),
        })
        .collect();
    Some(Block::Chart(Chart {
        title: title.to_string(),
        bars,
    }))
}

fn highlights(ctx: &Ctx) -> Callout {
    let data = &ctx.snap.data;
    let mut lines = Vec::new();

    if ctx.opts.incluir_comparacao {
        lines.push(format!(
            "Receita líquida de {} ({} vs. {})",
            data.receita.value,
            data.receita.change,
            ctx.comparacao_label()
        ));
    } else {
        lines.push(format!("Receita líquida de {}", data.receita.value));
    }

    if let Some(top) = data
        .revenue_composition
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))
    {
        lines.push(format!(
            "Principal fonte de receita: {} ({})",
            top.name, top.percentage
        ));
    }

    for trend in &data.trends {
        lines.push(format!(
            "{}: {} {} ({})",
            trend.name,
            trend.trend.arrow(),
            trend.change,
            trend.trend.label()
        ));
    }

    Callout {
        title: "Destaques do Período".to_string(),
        lines,
    }
}

/// Cross-check stated margins against the reported amounts.
fn consistency_observations(ctx: &Ctx) -> Callout {
    let data = &ctx.snap.data;
    let receita = ctx.receita();
    let mut lines = Vec::new();

    if receita == 0.0 {
        lines.push("Receita líquida não informada; margens não verificadas.".to_string());
    } else {
        let checks = [
            ("líquida", &data.lucro, &data.margem_liquida),
            ("EBITDA", &data.ebitda, &data.margem_ebitda),
        ];
        for (name, amount, margin) in checks {
            let (Some(amount), Some(stated)) = (parse_currency(&amount.value), parse_percent(&margin.value)) else {
                continue;
            };
            let computed = amount / receita * 100.0;
            if (computed - stated).abs() > MARGIN_TOLERANCE {
                lines.push(format!(
                    "Margem {} informada ({}) difere da calculada ({}).",
                    name,
                    margin.value,
                    format_percent(computed, 1)
                ));
            }
        }
    }

    if let (Some(lucro), Some(ebitda)) = (parse_currency(&data.lucro.value), parse_currency(&data.ebitda.value)) {
        if lucro > ebitda {
            lines.push("Lucro líquido superior ao EBITDA; verificar resultado financeiro e impostos.".to_string());
        }
    }

    for (name, items) in [
        ("receitas", &data.revenue_composition),
        ("despesas", &data.expense_distribution),
    ] {
        if items.is_empty() {
            continue;
        }
        let total: f64 = items.iter().map(|i| i.value).sum();
        if (total - 100.0).abs() > 0.5 {
            lines.push(format!(
                "Participações da composição de {} somam {}.",
                name,
                format_percent(total, 1)
            ));
        }
    }

    if lines.is_empty() {
        lines.push("Nenhuma inconsistência identificada entre valores e margens informados.".to_string());
    }

    Callout {
        title: "Observações de Consistência".to_string(),
        lines,
    }
}

fn signatures(ctx: &Ctx) -> Option<Block> {
    if !ctx.opts.incluir_assinatura {
        return None;
    }
    let signatories = if ctx.snap.company.signatories.is_empty() {
        vec![
            Signatory {
                name: String::new(),
                role: "Responsável Financeiro".to_string(),
            },
            Signatory {
                name: String::new(),
                role: "Contador Responsável".to_string(),
            },
        ]
    } else {
        ctx.snap.company.signatories.clone()
    };
    Some(Block::Signature(signatories))
}

fn push_opt(section: Section, block: Option<Block>) -> Section {
    match block {
        Some(block) => section.with(block),
        None => section,
    }
}

fn dre_table(ctx: &Ctx) -> Table {
    let data = &ctx.snap.data;
    let receita = ctx.receita();
    let margem_bruta = parse_percent(&data.margem_bruta.value).unwrap_or(0.0);
    let lucro_bruto = receita * margem_bruta / 100.0;
    let custos = receita - lucro_bruto;
    let ebitda = parse_currency(&data.ebitda.value).unwrap_or(0.0);
    let despesas = lucro_bruto - ebitda;

    if ctx.opts.incluir_comparacao {
        Table::new(
            "Demonstrativo de Resultado",
            ["Conta", "Valor Atual", "Período Anterior", "Variação %", "% Receita"],
        )
        .row([
            "RECEITA LÍQUIDA".to_string(),
            data.receita.value.clone(),
            ctx.prior_amount(&data.receita),
            data.receita.change.clone(),
            format_percent(100.0, 1),
        ])
        .row([
            "(-) CUSTOS DOS PRODUTOS VENDIDOS".to_string(),
            ctx.money(-custos),
            "-".to_string(),
            "-".to_string(),
            ctx.share_of_revenue(custos),
        ])
        .row([
            "LUCRO BRUTO".to_string(),
            ctx.money(lucro_bruto),
            "-".to_string(),
            data.margem_bruta.change.clone(),
            data.margem_bruta.value.clone(),
        ])
        .row([
            "(-) DESPESAS OPERACIONAIS".to_string(),
            ctx.money(-despesas),
            "-".to_string(),
            "-".to_string(),
            ctx.share_of_revenue(despesas),
        ])
        .row([
            "EBITDA".to_string(),
            data.ebitda.value.clone(),
            ctx.prior_amount(&data.ebitda),
            data.ebitda.change.clone(),
            data.margem_ebitda.value.clone(),
        ])
        .row([
            "LUCRO LÍQUIDO".to_string(),
            data.lucro.value.clone(),
            ctx.prior_amount(&data.lucro),
            data.lucro.change.clone(),
            data.margem_liquida.value.clone(),
        ])
    } else {
        Table::new("Demonstrativo de Resultado", ["Conta", "Valor Atual", "% Receita"])
            .row([
                "RECEITA LÍQUIDA".to_string(),
                data.receita.value.clone(),
                format_percent(100.0, 1),
            ])
            .row([
                "(-) CUSTOS DOS PRODUTOS VENDIDOS".to_string(),
                ctx.money(-custos),
                ctx.share_of_revenue(custos),
            ])
            .row([
                "LUCRO BRUTO".to_string(),
                ctx.money(lucro_bruto),
                data.margem_bruta.value.clone(),
            ])
            .row([
                "(-) DESPESAS OPERACIONAIS".to_string(),
                ctx.money(-despesas),
                ctx.share_of_revenue(despesas),
            ])
            .row([
                "EBITDA".to_string(),
                data.ebitda.value.clone(),
                data.margem_ebitda.value.clone(),
            ])
            .row([
                "LUCRO LÍQUIDO".to_string(),
                data.lucro.value.clone(),
                data.margem_liquida.value.clone(),
            ])
    }
}

fn revenue_total(ctx: &Ctx) -> String {
    ctx.snap.data.receita.value.clone()
}

fn expense_total(ctx: &Ctx) -> String {
    let total: f64 = ctx
        .snap
        .data
        .expense_distribution
        .iter()
        .filter_map(|item| parse_currency(&item.amount))
        .sum();
    ctx.money(total)
}

fn management_analysis(ctx: &Ctx) -> Vec<String> {
    let snap = ctx.snap;
    let data = &snap.data;
    let filters = &snap.filters;
    let mut paragraphs = Vec::new();

    let mut opening = format!(
        "No período {}, a receita líquida da entidade {} no cenário {} foi de {}",
        filters.periodo_label(),
        filters.entidade().label(),
        filters.cenario.label(),
        data.receita.value
    );
    if ctx.opts.incluir_comparacao {
        opening.push_str(&format!(
            ", variação de {} em relação à base {}",
            data.receita.change,
            ctx.comparacao_label()
        ));
    }
    opening.push('.');
    paragraphs.push(opening);

    paragraphs.push(format!(
        "O EBITDA alcançou {} (margem de {}) e o lucro líquido somou {} (margem líquida de {}). \
         O retorno sobre o patrimônio líquido ficou em {}.",
        data.ebitda.value,
        data.margem_ebitda.value,
        data.lucro.value,
        data.margem_liquida.value,
        data.roe.value
    ));

    if let Some(top) = data
        .expense_distribution
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))
    {
        paragraphs.push(format!(
            "As despesas operacionais concentram-se em {} ({} do total, {}). \
             Recomenda-se acompanhar essa rubrica no próximo fechamento.",
            top.name, top.percentage, top.amount
        ));
    }

    paragraphs
}

fn build_dre_gerencial(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let mut sections = Vec::new();

    sections.push(
        Section::new("Demonstrativo de Resultado")
            .sheet("DRE Resumo")
            .with(Block::Table(dre_table(ctx)))
            .with(metrics_block(ctx))
            .with(Block::Callout(highlights(ctx))),
    );

    if ctx.opts.incluir_detalhamento {
        let mut detail = Section::new("Composição").with(Block::Table(composition_table(
            "Composição da Receita",
            "Fonte",
            &data.revenue_composition,
            revenue_total(ctx),
        )));
        if ctx.opts.incluir_graficos {
            detail = push_opt(detail, composition_chart("Participação na Receita", &data.revenue_composition));
        }
        detail = detail.with(Block::Table(composition_table(
            "Distribuição de Despesas",
            "Categoria",
            &data.expense_distribution,
            expense_total(ctx),
        )));
        if ctx.opts.incluir_graficos {
            detail = push_opt(detail, composition_chart("Participação nas Despesas", &data.expense_distribution));
        }
        sections.push(detail);
    }

    let mut analysis = Section::new("Análise Gerencial").sheet("Análise").on_new_page();
    for paragraph in management_analysis(ctx) {
        analysis = analysis.with(Block::Paragraph(paragraph));
    }
    analysis = analysis.with(Block::Callout(consistency_observations(ctx)));
    sections.push(analysis);

    sections
}

fn build_dre_comparativo(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let base = ctx.comparacao_label();

    let mut table = Table::new(
        format!("Resultado vs. {base}"),
        ["Conta", "Valor Atual", base, "Diferença", "Variação %"],
    );
    for (label, metric) in [
        ("RECEITA LÍQUIDA", &data.receita),
        ("EBITDA", &data.ebitda),
        ("LUCRO LÍQUIDO", &data.lucro),
    ] {
        table = table.row([
            label.to_string(),
            metric.value.clone(),
            ctx.prior_amount(metric),
            ctx.difference(metric),
            metric.change.clone(),
        ]);
    }

    let mut comparison = Section::new("Comparativo").with(Block::Table(table));

    if ctx.opts.incluir_detalhamento {
        let mut margins = Table::new("Margens", ["Indicador", "Valor Atual", "Variação", "Tendência"]);
        for (label, metric) in [
            ("Margem Bruta", &data.margem_bruta),
            ("Margem EBITDA", &data.margem_ebitda),
            ("Margem Líquida", &data.margem_liquida),
            ("ROE", &data.roe),
        ] {
            margins = margins.row([
                label.to_string(),
                metric.value.clone(),
                metric.change.clone(),
                metric.trend.label().to_string(),
            ]);
        }
        comparison = comparison.with(Block::Table(margins));
    }

    let mut trends = Table::new("Tendências", ["Indicador", "Variação", "Tendência"]);
    for trend in &data.trends {
        trends = trends.row([
            trend.name.clone(),
            trend.change.clone(),
            trend.trend.label().to_string(),
        ]);
    }

    vec![comparison, Section::new("Tendências").with(Block::Table(trends))]
}

fn build_analise_margens(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let rows = [
        ("Margem Bruta", &data.margem_bruta),
        ("Margem EBITDA", &data.margem_ebitda),
        ("Margem Líquida", &data.margem_liquida),
        ("ROE", &data.roe),
    ];

    let mut table = if ctx.opts.incluir_comparacao {
        Table::new("Margens e Retorno", ["Indicador", "Valor", "Variação", "Tendência"])
    } else {
        Table::new("Margens e Retorno", ["Indicador", "Valor"])
    };
    for (label, metric) in rows {
        table = table.row([
            label.to_string(),
            metric.value.clone(),
            metric.change.clone(),
            metric.trend.label().to_string(),
        ]);
    }

    let mut margins = Section::new("Margens").with(Block::Table(table));

    if ctx.opts.incluir_graficos {
        let bars = rows
            .iter()
            .filter_map(|(label, metric)| {
                parse_percent(&metric.value).map(|share| Bar {
                    label: label.to_string(),
                    share: share.clamp(0.0, 100.0),
                    display: metric.value.clone(),
                    color: "#2563eb".to_string(),
                })
            })
            .collect();
        margins = margins.with(Block::Chart(Chart {
            title: "Margens sobre a Receita".to_string(),
            bars,
        }));
    }

    let symbol = ctx.snap.filters.moeda.symbol();
    let interpretation = Section::new("Interpretação")
        .with(Block::Paragraph(format!(
            "De cada {} 100 de receita líquida, {} permanecem após os custos diretos, \
             {} após as despesas operacionais e {} se convertem em lucro líquido.",
            symbol, data.margem_bruta.value, data.margem_ebitda.value, data.margem_liquida.value
        )))
        .with(Block::Callout(consistency_observations(ctx)));

    vec![margins, interpretation]
}

fn build_composicao_receitas(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let mut section = Section::new("Receitas").with(Block::Table(composition_table(
        "Composição da Receita",
        "Fonte de Receita",
        &data.revenue_composition,
        revenue_total(ctx),
    )));

    if ctx.opts.incluir_comparacao {
        section = section.with(Block::Paragraph(format!(
            "Receita líquida total de {}, variação de {} em relação à base {}.",
            data.receita.value,
            data.receita.change,
            ctx.comparacao_label()
        )));
    }
    if ctx.opts.incluir_graficos {
        section = push_opt(section, composition_chart("Participação por Fonte", &data.revenue_composition));
    }
    if ctx.opts.incluir_detalhamento {
        if let Some(top) = data
            .revenue_composition
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
        {
            section = section.with(Block::Callout(Callout {
                title: "Concentração".to_string(),
                lines: vec![
                    format!("{} fontes de receita no período.", data.revenue_composition.len()),
                    format!("Maior participação: {} com {} ({}).", top.name, top.percentage, top.amount),
                ],
            }));
        }
    }
    vec![section]
}

fn build_distribuicao_despesas(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let mut section = Section::new("Despesas").with(Block::Table(composition_table(
        "Distribuição de Despesas",
        "Categoria",
        &data.expense_distribution,
        expense_total(ctx),
    )));

    if ctx.opts.incluir_graficos {
        section = push_opt(section, composition_chart("Participação por Categoria", &data.expense_distribution));
    }
    if ctx.opts.incluir_detalhamento {
        let total: f64 = data
            .expense_distribution
            .iter()
            .filter_map(|item| parse_currency(&item.amount))
            .sum();
        section = section.with(Block::Callout(Callout {
            title: "Peso sobre a Receita".to_string(),
            lines: vec![format!(
                "Despesas operacionais de {} representam {} da receita líquida.",
                ctx.money(total),
                ctx.share_of_revenue(total)
            )],
        }));
    }
    vec![section]
}

fn build_resumo_executivo(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let mut highlights_section = Section::new("Destaques").with(Block::Callout(highlights(ctx)));
    if ctx.opts.incluir_graficos {
        highlights_section = push_opt(
            highlights_section,
            composition_chart("Composição da Receita", &data.revenue_composition),
        );
    }

    let summary = format!(
        "Resultado do período: receita líquida de {}, EBITDA de {} e lucro líquido de {}, \
         com margem líquida de {} e ROE de {}.",
        data.receita.value,
        data.ebitda.value,
        data.lucro.value,
        data.margem_liquida.value,
        data.roe.value
    );

    vec![
        Section::new("Indicadores").with(metrics_block(ctx)),
        highlights_section,
        Section::new("Síntese").with(Block::Paragraph(summary)),
    ]
}

fn build_default(ctx: &Ctx) -> Vec<Section> {
    let data = &ctx.snap.data;
    let table = Table::new("Resumo Financeiro", ["Indicador", "Valor", "Variação"])
        .row(["Receita Líquida", data.receita.value.as_str(), data.receita.change.as_str()])
        .row(["Lucro Líquido", data.lucro.value.as_str(), data.lucro.change.as_str()])
        .row(["EBITDA", data.ebitda.value.as_str(), data.ebitda.change.as_str()]);
    vec![Section::new("Resumo").with(Block::Table(table))]
}

/// Build the document for `template_type`, falling back to the default report.
pub fn build_document(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> ReportDocument {
    let ctx = Ctx {
        snap: snapshot,
        opts: options,
    };

    let template = get_template_by_id(template_type);
    let mut sections = match template.map(|t| t.id) {
        Some("dre-gerencial") => build_dre_gerencial(&ctx),
        Some("dre-comparativo") => build_dre_comparativo(&ctx),
        Some("analise-margens") => build_analise_margens(&ctx),
        Some("composicao-receitas") => build_composicao_receitas(&ctx),
        Some("distribuicao-despesas") => build_distribuicao_despesas(&ctx),
        Some("resumo-executivo") => build_resumo_executivo(&ctx),
        _ => {
            debug!("no builder for template '{template_type}', using default report");
            build_default(&ctx)
        }
    };

    if let Some(block) = signatures(&ctx) {
        if let Some(last) = sections.last_mut() {
            last.blocks.push(block);
        }
    }

    let (template_id, title) = match template {
        Some(t) if t.id != DEFAULT_TEMPLATE_ID => (t.id, t.name),
        _ => (DEFAULT_TEMPLATE_ID, "Relatório Financeiro"),
    };

    let filters = &snapshot.filters;
    ReportDocument {
        template_id: template_id.to_string(),
        title: title.to_string(),
        subtitle: format!(
            "{} • {} • {}",
            filters.entidade().label(),
            filters.cenario.label(),
            filters.periodo_label()
        ),
        metadata: metadata(&ctx),
        sections,
        footer: footer(&ctx),
    }
}
