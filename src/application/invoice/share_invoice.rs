use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::export::{
  DocumentExporter, ExportError, ExportSettings, MessageLauncher, PrintableLayout, Recipient,
  ShareMessage,
};
use crate::domain::invoice::InvoiceSnapshot;

#[derive(Debug, Clone)]
pub struct ShareInvoiceCommand {
  pub invoice: InvoiceSnapshot,
  /// Let the operator pick the recipient instead of using the customer mobile
  pub choose_contact: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareInvoiceResponse {
  pub recipient: Recipient,
  /// Where the PDF copy landed, when the export worked
  pub document: Option<PathBuf>,
}

/// Exports the document, then opens the share message for the customer
pub struct ShareInvoiceUseCase {
  exporter: Arc<dyn DocumentExporter>,
  launcher: Arc<dyn MessageLauncher>,
  settings: ExportSettings,
}

impl ShareInvoiceUseCase {
  pub fn new(
    exporter: Arc<dyn DocumentExporter>,
    launcher: Arc<dyn MessageLauncher>,
    settings: ExportSettings,
  ) -> Self {
    Self {
      exporter,
      launcher,
      settings,
    }
  }

  pub async fn execute(
    &self,
    command: ShareInvoiceCommand,
  ) -> Result<ShareInvoiceResponse, ExportError> {
    let invoice = &command.invoice;

    // A missing PDF does not stop the message
    let layout = PrintableLayout::from_invoice(invoice, &self.settings);
    let document = match self.exporter.export(&layout, &layout.hints.filename).await {
      Ok(path) => Some(path),
      Err(e) => {
        tracing::warn!(
          invoice_number = %invoice.invoice_number,
          "Export before sharing failed: {}",
          e
        );
        None
      }
    };

    let message = ShareMessage::from_invoice(invoice, &self.settings, command.choose_contact);
    self
      .launcher
      .launch(&message.recipient, &message.encoded_body)
      .await?;

    tracing::info!(
      invoice_number = %invoice.invoice_number,
      recipient = ?message.recipient,
      "Invoice shared"
    );

    Ok(ShareInvoiceResponse {
      recipient: message.recipient,
      document,
    })
  }
}
