use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::export::{DocumentExporter, ExportError, ExportSettings, PrintableLayout};
use crate::domain::invoice::InvoiceSnapshot;

#[derive(Debug, Clone)]
pub struct ExportInvoiceCommand {
  /// A persisted invoice or a draft preview
  pub invoice: InvoiceSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportInvoiceResponse {
  pub path: PathBuf,
  pub filename: String,
}

pub struct ExportInvoiceUseCase {
  exporter: Arc<dyn DocumentExporter>,
  settings: ExportSettings,
}

impl ExportInvoiceUseCase {
  pub fn new(exporter: Arc<dyn DocumentExporter>, settings: ExportSettings) -> Self {
    Self { exporter, settings }
  }

  /// Layout that `execute` would hand to the exporter
  pub fn layout(&self, invoice: &InvoiceSnapshot) -> PrintableLayout {
    PrintableLayout::from_invoice(invoice, &self.settings)
  }

  pub async fn execute(
    &self,
    command: ExportInvoiceCommand,
  ) -> Result<ExportInvoiceResponse, ExportError> {
    let layout = self.layout(&command.invoice);
    let filename = layout.hints.filename.clone();

    let path = self.exporter.export(&layout, &filename).await?;
    tracing::info!(
      invoice_number = %command.invoice.invoice_number,
      path = %path.display(),
      "Invoice exported"
    );

    Ok(ExportInvoiceResponse { path, filename })
  }
}
