use serde::{Deserialize, Serialize};

use super::format::{display_mobile, format_currency, format_date, format_percent};
use super::layout::INVOICE_TITLE;
use super::settings::ExportSettings;
use crate::domain::invoice::{CGST_RATE, InvoiceSnapshot, SGST_RATE};

const RULE: &str = "------------------------------------";

/// Who the share message is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "phone")]
pub enum Recipient {
  /// International number, digits only
  Phone(String),
  /// Let the operator pick a contact in the messaging app
  ChooseContact,
}

impl Recipient {
  /// Customer's mobile as dialable digits, or `ChooseContact` when unknown
  pub fn for_mobile(mobile: &str, country_code: &str) -> Self {
    let mobile = mobile.trim();
    let digits: String = mobile.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
      return Recipient::ChooseContact;
    }
    if mobile.starts_with('+') {
      return Recipient::Phone(digits);
    }
    let prefix: String = country_code.chars().filter(char::is_ascii_digit).collect();
    Recipient::Phone(format!("{}{}", prefix, digits))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMessage {
  pub recipient: Recipient,
  pub body: String,
  /// `body` percent-encoded as a URI component; line breaks become `%0A`
  pub encoded_body: String,
}

impl ShareMessage {
  pub fn from_invoice(
    invoice: &InvoiceSnapshot,
    settings: &ExportSettings,
    choose_contact: bool,
  ) -> Self {
    let recipient = if choose_contact {
      Recipient::ChooseContact
    } else {
      Recipient::for_mobile(&invoice.customer_mobile, &settings.country_code)
    };
    let body = compose_body(invoice, settings);
    let encoded_body = urlencoding::encode(&body).into_owned();

    Self {
      recipient,
      body,
      encoded_body,
    }
  }
}

fn compose_body(invoice: &InvoiceSnapshot, settings: &ExportSettings) -> String {
  let agency = &invoice.agency_snapshot;
  let mut lines: Vec<String> = Vec::new();

  lines.push(format!("*{}*", agency.name));
  if !agency.tagline.trim().is_empty() {
    lines.push(format!("_{}_", agency.tagline));
  }
  lines.push(RULE.to_string());
  lines.push(format!("*{}*", INVOICE_TITLE));
  lines.push(format!("*Bill No:* {}", invoice.invoice_number));
  lines.push(format!("*Date:* {}", format_date(invoice.date)));
  lines.push(RULE.to_string());
  lines.push(format!("*CUSTOMER:* {}", invoice.customer_name));
  lines.push(format!("*GSTIN:* {}", invoice.customer_gstin));
  lines.push(format!(
    "*Mob:* {}",
    display_mobile(&invoice.customer_mobile, &settings.country_code)
  ));
  lines.push(String::new());

  if invoice.transport.is_present() {
    lines.push("*TRANSPORT DETAILS:*".to_string());
    lines.push(format!("- Vehicle: {}", or_na(&invoice.transport.vehicle_no)));
    lines.push(format!("- Agency: {}", or_na(&invoice.transport.transport_name)));
    lines.push(String::new());
  }

  lines.push("*ITEMS:*".to_string());
  for (i, item) in invoice.items.iter().enumerate() {
    if i > 0 {
      lines.push(String::new());
    }
    lines.push(format!("{}. *{}*", i + 1, item.product_name));
    lines.push(format!(
      "   Qty: {} | Rate: {} | Amt: {}",
      item.quantity,
      format_currency(item.rate),
      format_currency(item.amount())
    ));
  }

  lines.push(RULE.to_string());
  lines.push(format!(
    "*Taxable Val:* {}",
    format_currency(invoice.totals.subtotal)
  ));
  lines.push(format!(
    "*CGST ({}%):* {}",
    format_percent(CGST_RATE),
    format_currency(invoice.totals.cgst)
  ));
  lines.push(format!(
    "*SGST ({}%):* {}",
    format_percent(SGST_RATE),
    format_currency(invoice.totals.sgst)
  ));
  lines.push(format!(
    "*TOTAL AMOUNT:* {}",
    format_currency(invoice.totals.total)
  ));
  lines.push(RULE.to_string());

  if !settings.contact_number.trim().is_empty() {
    lines.push(format!(
      "*Note:* {} *{}*",
      settings.share_note.trim(),
      settings.contact_number.trim()
    ));
    lines.push(RULE.to_string());
  }
  lines.push("*Thank You!*".to_string());

  lines.join("\n")
}

fn or_na(value: &str) -> &str {
  let value = value.trim();
  if value.is_empty() { "N/A" } else { value }
}
