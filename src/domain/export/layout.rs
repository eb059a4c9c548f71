use serde::{Deserialize, Serialize};

use super::errors::ExportError;
use super::format::{display_mobile, format_amount, format_currency, format_date, format_percent};
use super::settings::ExportSettings;
use crate::domain::invoice::{CGST_RATE, InvoiceSnapshot, SGST_RATE};

pub const INVOICE_TITLE: &str = "TAX INVOICE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
  A4,
}

impl PageSize {
  pub fn as_str(&self) -> &'static str {
    match self {
      PageSize::A4 => "A4",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
  Portrait,
}

impl Orientation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Orientation::Portrait => "Portrait",
    }
  }
}

/// How the document exporter should rasterise the layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHints {
  pub filename: String,
  pub margin_mm: u32,
  pub scale: u32,
  pub page_size: PageSize,
  pub orientation: Orientation,
}

impl RenderHints {
  pub fn for_invoice(invoice_number: &str, customer_name: &str) -> Self {
    Self {
      filename: format!("{}_{}.pdf", invoice_number, customer_name),
      margin_mm: 10,
      scale: 2,
      page_size: PageSize::A4,
      orientation: Orientation::Portrait,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHeader {
  pub agency_name: String,
  pub tagline: String,
  pub address: String,
  pub gstin: String,
  pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBlock {
  pub name: String,
  pub mobile: String,
  pub gstin: String,
  pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportBlock {
  pub vehicle: String,
  pub agency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRow {
  pub index: usize,
  pub description: String,
  pub hsn: String,
  pub quantity: u32,
  pub rate: String,
  pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalLine {
  pub label: String,
  pub amount: String,
}

/// Everything needed to print one invoice, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableLayout {
  pub header: LayoutHeader,
  pub title: String,
  pub invoice_number: String,
  pub date: String,
  pub customer: CustomerBlock,
  pub transport: Option<TransportBlock>,
  pub rows: Vec<LayoutRow>,
  pub totals: Vec<TotalLine>,
  pub grand_total: TotalLine,
  pub terms: Vec<String>,
  pub signatory: String,
  pub hints: RenderHints,
}

impl PrintableLayout {
  pub fn from_invoice(invoice: &InvoiceSnapshot, settings: &ExportSettings) -> Self {
    let agency = &invoice.agency_snapshot;
    let transport = invoice.transport.is_present().then(|| TransportBlock {
      vehicle: or_default(&invoice.transport.vehicle_no, "N/A"),
      agency: or_default(&invoice.transport.transport_name, "Direct"),
    });

    let rows = invoice
      .items
      .iter()
      .enumerate()
      .map(|(i, item)| LayoutRow {
        index: i + 1,
        description: item.product_name.clone(),
        hsn: item.hsn_code.clone(),
        quantity: item.quantity,
        rate: format_amount(item.rate),
        amount: format_amount(item.amount()),
      })
      .collect();

    let totals = vec![
      TotalLine {
        label: "Subtotal".to_string(),
        amount: format_currency(invoice.totals.subtotal),
      },
      TotalLine {
        label: format!("CGST @ {}%", format_percent(CGST_RATE)),
        amount: format_currency(invoice.totals.cgst),
      },
      TotalLine {
        label: format!("SGST @ {}%", format_percent(SGST_RATE)),
        amount: format_currency(invoice.totals.sgst),
      },
    ];

    Self {
      header: LayoutHeader {
        agency_name: agency.name.clone(),
        tagline: agency.tagline.clone(),
        address: agency.address.clone(),
        gstin: agency.gstin.clone(),
        phone: agency.phone.clone(),
      },
      title: INVOICE_TITLE.to_string(),
      invoice_number: invoice.invoice_number.clone(),
      date: format_date(invoice.date),
      customer: CustomerBlock {
        name: invoice.customer_name.clone(),
        mobile: display_mobile(&invoice.customer_mobile, &settings.country_code),
        gstin: invoice.customer_gstin.clone(),
        address: invoice.customer_address.clone(),
      },
      transport,
      rows,
      totals,
      grand_total: TotalLine {
        label: "GRAND TOTAL".to_string(),
        amount: format_currency(invoice.totals.total),
      },
      terms: settings.terms.clone(),
      signatory: settings.signatory.clone(),
      hints: RenderHints::for_invoice(&invoice.invoice_number, &invoice.customer_name),
    }
  }

  /// Compact JSON with fields in declaration order. Equal layouts always
  /// produce identical bytes.
  pub fn to_canonical_json(&self) -> Result<String, ExportError> {
    Ok(serde_json::to_string(self)?)
  }
}

fn or_default(value: &str, fallback: &str) -> String {
  let value = value.trim();
  if value.is_empty() {
    fallback.to_string()
  } else {
    value.to_string()
  }
}
