use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::compose_session::ComposingSession;
use crate::domain::invoice::{InvoiceError, LineItemPatch, Rate, Transport};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineRequest {
  #[serde(default)]
  pub product_id: Option<String>,
  #[serde(default = "default_quantity")]
  pub quantity: u32,
  #[serde(default)]
  pub rate: Decimal,
}

fn default_quantity() -> u32 {
  1
}

/// A whole draft given at once, e.g. read from a JSON file.
/// Fields left out keep the session's current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
  #[serde(default)]
  pub customer_id: Option<String>,
  #[serde(default)]
  pub invoice_number: Option<String>,
  #[serde(default)]
  pub date: Option<NaiveDate>,
  #[serde(default)]
  pub transport: Option<Transport>,
  /// Replaces every line of the draft when not empty
  #[serde(default)]
  pub items: Vec<DraftLineRequest>,
}

impl DraftRequest {
  /// Apply the request through the session's edit operations
  pub fn apply_to(self, session: &ComposingSession) -> Result<(), InvoiceError> {
    // Check every rate before touching the draft
    let rates = self
      .items
      .iter()
      .map(|item| Rate::new(item.rate))
      .collect::<Result<Vec<_>, _>>()?;

    if let Some(customer_id) = self.customer_id {
      session.set_customer(Some(customer_id))?;
    }
    if let Some(invoice_number) = self.invoice_number {
      session.set_invoice_number(invoice_number)?;
    }
    if let Some(date) = self.date {
      session.set_date(date)?;
    }
    if let Some(transport) = self.transport {
      session.set_transport(transport)?;
    }

    if self.items.is_empty() {
      return Ok(());
    }
    for line in session.draft().line_items() {
      session.remove_line_item(line.local_id)?;
    }
    for (item, rate) in self.items.into_iter().zip(rates) {
      let local_id = session.add_line_item()?;
      let patch = LineItemPatch {
        product_id: Some(item.product_id),
        quantity: Some(item.quantity),
        rate: Some(rate),
      };
      session.edit_line_item(local_id, patch)?;
    }
    Ok(())
  }
}
