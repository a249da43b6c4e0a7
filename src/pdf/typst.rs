use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{ReportError, Result};
use crate::pdf::layout::PdfDocument;

/// Embedded Typst template. It knows nothing about reports: it places every
/// laid-out operation at its absolute position (millimetres, top left origin).
const PAGES_TEMPLATE: &str = r##"// Laid-out report pages
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  width: data.width * 1mm,
  height: data.height * 1mm,
  margin: 0pt,
)

#set text(font: "Helvetica")

#let draw(op) = {
  if op.kind == "rect" {
    place(top + left, dx: op.x * 1mm, dy: op.y * 1mm, rect(
      width: op.w * 1mm,
      height: op.h * 1mm,
      fill: rgb(op.fill),
      stroke: if op.stroke == none { none } else { 0.3pt + rgb(op.stroke) },
    ))
  } else if op.kind == "text" {
    place(top + left, dx: op.x * 1mm, dy: op.y * 1mm, text(
      size: op.size * 1pt,
      weight: if op.bold { "bold" } else { "regular" },
      fill: rgb(op.color),
      op.content,
    ))
  } else if op.kind == "line" {
    place(top + left, line(
      start: (op.x1 * 1mm, op.y1 * 1mm),
      end: (op.x2 * 1mm, op.y2 * 1mm),
      stroke: op.width * 1pt + rgb(op.color),
    ))
  }
}

#for (i, pg) in data.pages.enumerate() {
  if i > 0 { pagebreak() }
  for op in pg.ops { draw(op) }
}
"##;

/// Write `pdf` to `output_path` using the Typst CLI
pub fn compile_pdf(pdf: &PdfDocument, output_path: &Path) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(ReportError::TypstNotFound);
    }

    // One scratch directory per process
    let temp_dir = std::env::temp_dir().join(format!("dre-reports-{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let json_data =
        serde_json::to_string(pdf).map_err(|e| ReportError::PdfGeneration(e.to_string()))?;
    let json_path = temp_dir.join("pages.json");
    std::fs::write(&json_path, &json_data)?;

    let template_content = PAGES_TEMPLATE.replace("DATA_JSON_PATH", "pages.json");
    let template_path = temp_dir.join("report.typ");
    std::fs::write(&template_path, &template_content)?;

    debug!(
        "typst: compiling {} page(s) to {}",
        pdf.page_count(),
        output_path.display()
    );
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output();

    let _ = std::fs::remove_dir_all(&temp_dir);

    let output = output?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReportError::PdfGeneration(stderr.to_string()));
    }

    Ok(())
}
