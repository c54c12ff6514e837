//! HTML-to-PDF rendering through an external `wkhtmltopdf` binary.

pub mod renderer;
pub mod template;

pub use renderer::{PdfRenderer, RendererLocator, DOWNLOAD_JS_DELAY_MS, EMAIL_JS_DELAY_MS};
pub use template::render_invoice_html;
