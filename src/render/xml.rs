use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::dashboard::Snapshot;
use crate::error::{ReportError, Result};
use crate::report::{build_document, Block, ReportDocument, ReportOptions};

/// Thin wrapper over the quick-xml writer. Text and attribute values are
/// escaped on write (`& < > " '`).
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ReportError::render("XML", e))
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for &(key, value) in attrs {
            start.push_attribute((key, value));
        }
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for &(key, value) in attrs {
            start.push_attribute((key, value));
        }
        self.event(Event::Empty(start))
    }

    fn text(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| ReportError::render("XML", e))
    }
}

fn write_block(out: &mut XmlOut, block: &Block) -> Result<()> {
    match block {
        Block::Table(table) => {
            out.open("tabela", &[("titulo", table.title.as_str())])?;
            out.open("cabecalho", &[])?;
            for column in &table.header {
                out.text("coluna", &[], column)?;
            }
            out.close("cabecalho")?;
            for row in &table.rows {
                out.open("linha", &[])?;
                for (column, cell) in table.header.iter().zip(row) {
                    out.text("celula", &[("coluna", column.as_str())], cell)?;
                }
                out.close("linha")?;
            }
            out.close("tabela")
        }
        Block::Metrics(metrics) => {
            out.open("indicadores", &[])?;
            for metric in metrics {
                out.open(
                    "indicador",
                    &[
                        ("nome", metric.label.as_str()),
                        ("tendencia", metric.trend.label()),
                    ],
                )?;
                out.text("valor", &[], &metric.value)?;
                out.text("variacao", &[], &metric.change)?;
                out.close("indicador")?;
            }
            out.close("indicadores")
        }
        Block::Chart(chart) => {
            out.open("grafico", &[("titulo", chart.title.as_str())])?;
            for bar in &chart.bars {
                out.text(
                    "barra",
                    &[("rotulo", bar.label.as_str()), ("cor", bar.color.as_str())],
                    &bar.display,
                )?;
            }
            out.close("grafico")
        }
        Block::Callout(callout) => {
            out.open("destaque", &[("titulo", callout.title.as_str())])?;
            for line in &callout.lines {
                out.text("item", &[], line)?;
            }
            out.close("destaque")
        }
        Block::Paragraph(text) => out.text("paragrafo", &[], text),
        Block::Signature(signatories) => {
            out.open("assinaturas", &[])?;
            for signatory in signatories {
                out.empty(
                    "assinatura",
                    &[("nome", signatory.name.as_str()), ("cargo", signatory.role.as_str())],
                )?;
            }
            out.close("assinaturas")
        }
    }
}

pub fn render(document: &ReportDocument) -> Result<String> {
    let mut out = XmlOut::new();

    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    out.open("relatorio", &[("template", document.template_id.as_str())])?;
    out.text("titulo", &[], &document.title)?;
    out.text("subtitulo", &[], &document.subtitle)?;

    out.open("metadados", &[])?;
    for (label, value) in &document.metadata {
        out.text("campo", &[("nome", label.as_str())], value)?;
    }
    out.close("metadados")?;

    for section in &document.sections {
        out.open("secao", &[("titulo", section.title.as_str())])?;
        for block in &section.blocks {
            write_block(&mut out, block)?;
        }
        out.close("secao")?;
    }

    if let Some(footer) = &document.footer {
        out.text("rodape", &[], footer)?;
    }
    out.close("relatorio")?;

    let mut xml = out.finish()?;
    xml.push('\n');
    Ok(xml)
}

/// Build and serialize the XML report for `template_type`; unknown ids give the default report.
pub fn generate(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> Result<String> {
    render(&build_document(template_type, snapshot, options))
}
