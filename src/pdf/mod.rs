pub mod layout;
mod typst;

pub use layout::{render_pdf, DrawOp, LayoutManager, PdfDocument, PdfPage};
pub use typst::compile_pdf;
