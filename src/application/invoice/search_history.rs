use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::invoice::{Invoice, InvoiceError, ledger};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHistoryCommand {
  /// Matched against customer name and invoice number; blank lists everything
  #[serde(default)]
  pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummaryDto {
  pub id: String,
  pub invoice_number: String,
  pub customer_name: String,
  pub date: NaiveDate,
  pub filing_path: String,
  pub total: Decimal,
  pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceSummaryDto {
  fn from(invoice: &Invoice) -> Self {
    Self {
      id: invoice.id.clone(),
      invoice_number: invoice.snapshot.invoice_number.clone(),
      customer_name: invoice.snapshot.customer_name.clone(),
      date: invoice.snapshot.date,
      filing_path: invoice.snapshot.filing_path.to_string(),
      total: invoice.snapshot.totals.total,
      created_at: invoice.snapshot.created_at,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHistoryResponse {
  pub invoices: Vec<InvoiceSummaryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilingFolderDto {
  pub filing_path: String,
  pub invoice_count: usize,
  pub total: Decimal,
  pub invoices: Vec<InvoiceSummaryDto>,
}

/// Read-only queries over the synchronized invoice ledger
pub struct SearchHistoryUseCase {
  invoices: watch::Receiver<Arc<Vec<Invoice>>>,
}

impl SearchHistoryUseCase {
  pub fn new(invoices: watch::Receiver<Arc<Vec<Invoice>>>) -> Self {
    Self { invoices }
  }

  pub fn execute(&self, command: SearchHistoryCommand) -> SearchHistoryResponse {
    let invoices = self.invoices.borrow().clone();
    SearchHistoryResponse {
      invoices: ledger::search(&invoices, &command.query)
        .into_iter()
        .map(InvoiceSummaryDto::from)
        .collect(),
    }
  }

  /// Invoices grouped by `year/Month`, folders in calendar order
  pub fn folders(&self) -> Vec<FilingFolderDto> {
    let invoices = self.invoices.borrow().clone();
    ledger::group_by_filing_path(&invoices)
      .into_iter()
      .map(|(path, group)| FilingFolderDto {
        filing_path: path.to_string(),
        invoice_count: group.len(),
        total: group.iter().map(|i| i.snapshot.totals.total).sum(),
        invoices: group.into_iter().map(InvoiceSummaryDto::from).collect(),
      })
      .collect()
  }

  /// Full invoice by store id, or by invoice number when no id matches.
  /// Numbers are not unique; the newest match wins.
  pub fn find(&self, id_or_number: &str) -> Result<Invoice, InvoiceError> {
    let key = id_or_number.trim();
    let invoices = self.invoices.borrow().clone();

    if let Some(invoice) = invoices.iter().find(|i| i.id == key) {
      return Ok(invoice.clone());
    }

    ledger::search(&invoices, "")
      .into_iter()
      .find(|i| i.snapshot.invoice_number.eq_ignore_ascii_case(key))
      .cloned()
      .ok_or_else(|| InvoiceError::InvoiceNotFound(key.to_string()))
  }
}
