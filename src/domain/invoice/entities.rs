use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{InvoiceTotals, line_amount};
use super::value_objects::FilingPath;
use crate::domain::registry::AgencyProfile;

// Transport - Optional shipping details printed on the invoice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
  #[serde(default)]
  pub vehicle_no: String,
  #[serde(default)]
  pub transport_name: String,
}

impl Transport {
  pub fn new(vehicle_no: impl Into<String>, transport_name: impl Into<String>) -> Self {
    Self {
      vehicle_no: vehicle_no.into(),
      transport_name: transport_name.into(),
    }
  }

  /// True when at least one field carries text
  pub fn is_present(&self) -> bool {
    !self.vehicle_no.trim().is_empty() || !self.transport_name.trim().is_empty()
  }
}

// Invoice Item - Line copied from the draft and the product registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
  pub product_id: String,
  pub product_name: String,
  pub hsn_code: String,
  pub quantity: u32,
  pub rate: Decimal,
}

impl InvoiceItem {
  pub fn amount(&self) -> Decimal {
    line_amount(self.quantity, self.rate)
  }
}

/// Everything written for one invoice.
///
/// Agency, customer and product fields are copies taken when the invoice was
/// finalized. Later registry edits never reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSnapshot {
  pub invoice_number: String,
  pub agency_snapshot: AgencyProfile,
  pub customer_id: String,
  pub customer_name: String,
  #[serde(default)]
  pub customer_mobile: String,
  #[serde(default)]
  pub customer_gstin: String,
  #[serde(default)]
  pub customer_address: String,
  #[serde(default)]
  pub transport: Transport,
  pub items: Vec<InvoiceItem>,
  pub totals: InvoiceTotals,
  pub date: NaiveDate,
  pub filing_path: FilingPath,
  pub created_at: DateTime<Utc>,
}

impl InvoiceSnapshot {
  /// Totals recomputed from the items, for checking the stored ones
  pub fn recomputed_totals(&self) -> InvoiceTotals {
    InvoiceTotals::calculate(self.items.iter().map(|i| (i.quantity, i.rate)))
  }
}

// Invoice - A persisted snapshot and the id the store gave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: String,
  #[serde(flatten)]
  pub snapshot: InvoiceSnapshot,
}

impl Invoice {
  pub fn new(id: String, snapshot: InvoiceSnapshot) -> Self {
    Self { id, snapshot }
  }
}
