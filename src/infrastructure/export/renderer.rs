use std::sync::Arc;
use tera::{Context, Tera};

use crate::domain::export::{ExportError, PrintableLayout};

const INVOICE_TEMPLATE: &str = "invoice.html.tera";

/// Renders a printable layout into a standalone HTML page
#[derive(Clone)]
pub struct HtmlRenderer {
  tera: Arc<Tera>,
}

impl HtmlRenderer {
  /// Renderer using the invoice template compiled into the binary
  pub fn new() -> Result<Self, ExportError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html.tera"]);
    tera
      .add_raw_template(
        INVOICE_TEMPLATE,
        include_str!("../../../templates/invoice.html.tera"),
      )
      .map_err(|e| ExportError::Render(e.to_string()))?;

    Ok(Self {
      tera: Arc::new(tera),
    })
  }

  pub fn render(&self, layout: &PrintableLayout) -> Result<String, ExportError> {
    let context = Context::from_serialize(layout).map_err(|e| ExportError::Render(e.to_string()))?;
    self
      .tera
      .render(INVOICE_TEMPLATE, &context)
      .map_err(|e| ExportError::Render(e.to_string()))
  }
}
