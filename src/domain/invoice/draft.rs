//! In-memory invoice under composition and its lifecycle.
//!
//! ```text
//!   Empty ──edit──► Composing ──begin_finalize──► Finalizing
//!     ▲                 ▲                             │
//!     │                 └────────abort_finalize───────┤
//!     └─────────────────────complete_finalize─────────┘
//! ```
//!
//! The `Finalizing` guard lives here so it holds for every caller: edits
//! are refused and a second `begin_finalize` is a no-op until the first one
//! completes or aborts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calculator::InvoiceTotals;
use super::entities::{InvoiceItem, InvoiceSnapshot, Transport};
use super::errors::InvoiceError;
use super::value_objects::{FilingPath, InvoiceNumber, Rate};
use crate::domain::registry::{Customer, HsnCode, ReferenceData};

/// Name printed for a line whose product is unknown
pub const PLACEHOLDER_PRODUCT_NAME: &str = "Product";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPhase {
  Empty,
  Composing,
  Finalizing,
}

/// Session-local correlation key of a draft line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineItemId(u64);

impl LineItemId {
  pub fn value(&self) -> u64 {
    self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItem {
  pub local_id: LineItemId,
  pub product_id: Option<String>,
  pub quantity: u32,
  pub rate: Rate,
}

impl DraftLineItem {
  fn blank(local_id: LineItemId) -> Self {
    Self {
      local_id,
      product_id: None,
      quantity: 1,
      rate: Rate::zero(),
    }
  }

  pub fn has_product(&self) -> bool {
    self
      .product_id
      .as_deref()
      .is_some_and(|id| !id.trim().is_empty())
  }
}

/// Partial update of a draft line; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemPatch {
  pub product_id: Option<Option<String>>,
  pub quantity: Option<u32>,
  pub rate: Option<Rate>,
}

impl LineItemPatch {
  pub fn product(product_id: impl Into<String>) -> Self {
    Self {
      product_id: Some(Some(product_id.into())),
      ..Self::default()
    }
  }

  pub fn quantity(mut self, quantity: u32) -> Self {
    self.quantity = Some(quantity);
    self
  }

  pub fn rate(mut self, rate: Rate) -> Self {
    self.rate = Some(rate);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInvoice {
  invoice_number: String,
  date: NaiveDate,
  customer_id: Option<String>,
  transport: Transport,
  line_items: Vec<DraftLineItem>,
  phase: DraftPhase,
  #[serde(skip)]
  next_local_id: u64,
}

impl DraftInvoice {
  /// Fresh `Empty` draft holding one blank placeholder line
  pub fn new(invoice_number: InvoiceNumber, date: NaiveDate) -> Self {
    let mut draft = Self {
      invoice_number: invoice_number.into_inner(),
      date,
      customer_id: None,
      transport: Transport::default(),
      line_items: Vec::new(),
      phase: DraftPhase::Empty,
      next_local_id: 1,
    };
    let id = draft.allocate_id();
    draft.line_items.push(DraftLineItem::blank(id));
    draft
  }

  pub fn invoice_number(&self) -> &str {
    &self.invoice_number
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  pub fn customer_id(&self) -> Option<&str> {
    self.customer_id.as_deref()
  }

  pub fn transport(&self) -> &Transport {
    &self.transport
  }

  pub fn line_items(&self) -> &[DraftLineItem] {
    &self.line_items
  }

  pub fn phase(&self) -> DraftPhase {
    self.phase
  }

  /// Live totals, recomputed on every call
  pub fn totals(&self) -> InvoiceTotals {
    InvoiceTotals::calculate(self.line_items.iter().map(|i| (i.quantity, i.rate.value())))
  }

  pub fn add_line_item(&mut self) -> Result<LineItemId, InvoiceError> {
    self.begin_edit()?;
    let id = self.allocate_id();
    self.line_items.push(DraftLineItem::blank(id));
    Ok(id)
  }

  /// Removing the last line is allowed; finalize rejects an empty draft
  pub fn remove_line_item(&mut self, local_id: LineItemId) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    let index = self.position(local_id)?;
    self.line_items.remove(index);
    Ok(())
  }

  pub fn edit_line_item(
    &mut self,
    local_id: LineItemId,
    patch: LineItemPatch,
  ) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    let index = self.position(local_id)?;
    let item = &mut self.line_items[index];
    if let Some(product_id) = patch.product_id {
      item.product_id = product_id.filter(|id| !id.trim().is_empty());
    }
    if let Some(quantity) = patch.quantity {
      item.quantity = quantity;
    }
    if let Some(rate) = patch.rate {
      item.rate = rate;
    }
    Ok(())
  }

  pub fn set_customer(&mut self, customer_id: Option<String>) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    self.customer_id = customer_id.filter(|id| !id.trim().is_empty());
    Ok(())
  }

  pub fn set_date(&mut self, date: NaiveDate) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    self.date = date;
    Ok(())
  }

  pub fn set_transport(&mut self, transport: Transport) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    self.transport = transport;
    Ok(())
  }

  pub fn set_invoice_number(&mut self, invoice_number: String) -> Result<(), InvoiceError> {
    self.begin_edit()?;
    self.invoice_number = invoice_number;
    Ok(())
  }

  /// Validate the draft and build the snapshot to persist.
  ///
  /// Returns `Ok(None)` when a finalize is already in flight. On validation
  /// failure the draft stays in `Composing` and is otherwise untouched.
  pub fn begin_finalize(
    &mut self,
    refs: &ReferenceData,
    now: DateTime<Utc>,
  ) -> Result<Option<InvoiceSnapshot>, InvoiceError> {
    if self.phase == DraftPhase::Finalizing {
      return Ok(None);
    }

    match self.build_snapshot(refs, now) {
      Ok(snapshot) => {
        self.phase = DraftPhase::Finalizing;
        Ok(Some(snapshot))
      }
      Err(e) => {
        self.phase = DraftPhase::Composing;
        Err(e)
      }
    }
  }

  /// The store accepted the invoice: start over with fresh values
  pub fn complete_finalize(&mut self, next_number: InvoiceNumber, today: NaiveDate) {
    self.invoice_number = next_number.into_inner();
    self.date = today;
    self.customer_id = None;
    self.transport = Transport::default();
    self.line_items.clear();
    let id = self.allocate_id();
    self.line_items.push(DraftLineItem::blank(id));
    self.phase = DraftPhase::Empty;
  }

  /// The store rejected the invoice: keep every field for a manual retry
  pub fn abort_finalize(&mut self) {
    if self.phase == DraftPhase::Finalizing {
      self.phase = DraftPhase::Composing;
    }
  }

  /// Snapshot that finalize would write now, or the first reason it cannot
  pub fn build_snapshot(
    &self,
    refs: &ReferenceData,
    now: DateTime<Utc>,
  ) -> Result<InvoiceSnapshot, InvoiceError> {
    let customer_id = self
      .customer_id
      .as_deref()
      .ok_or(InvoiceError::NoCustomerSelected)?;
    if self.line_items.is_empty() {
      return Err(InvoiceError::NoLineItems);
    }
    if !self.line_items.iter().any(DraftLineItem::has_product) {
      return Err(InvoiceError::NoProductSelected);
    }
    let invoice_number = InvoiceNumber::new(self.invoice_number.clone())?;
    let customer = refs
      .find_customer(customer_id)
      .ok_or_else(|| InvoiceError::CustomerNotFound(customer_id.to_string()))?;

    Ok(self.project(
      invoice_number.into_inner(),
      customer_id,
      Some(customer),
      refs,
      now,
    ))
  }

  /// Live projection for previews. Never fails; unresolved references are
  /// left blank or replaced by placeholders.
  pub fn preview(&self, refs: &ReferenceData, now: DateTime<Utc>) -> InvoiceSnapshot {
    let customer_id = self.customer_id.as_deref().unwrap_or_default();
    let customer = self
      .customer_id
      .as_deref()
      .and_then(|id| refs.find_customer(id));
    self.project(
      self.invoice_number.trim().to_string(),
      customer_id,
      customer,
      refs,
      now,
    )
  }

  fn project(
    &self,
    invoice_number: String,
    customer_id: &str,
    customer: Option<&Customer>,
    refs: &ReferenceData,
    now: DateTime<Utc>,
  ) -> InvoiceSnapshot {
    let items: Vec<InvoiceItem> = self
      .line_items
      .iter()
      .map(|line| resolve_item(line, refs))
      .collect();
    let totals = InvoiceTotals::calculate(items.iter().map(|i| (i.quantity, i.rate)));

    InvoiceSnapshot {
      invoice_number,
      agency_snapshot: refs.agency.clone(),
      customer_id: customer_id.to_string(),
      customer_name: customer.map(|c| c.name.clone()).unwrap_or_default(),
      customer_mobile: customer.map(Customer::mobile_display).unwrap_or_default(),
      customer_gstin: customer
        .map(|c| c.gstin.as_str().to_string())
        .unwrap_or_default(),
      customer_address: customer.map(|c| c.address.clone()).unwrap_or_default(),
      transport: self.transport.clone(),
      items,
      totals,
      date: self.date,
      filing_path: FilingPath::for_date(self.date),
      created_at: now,
    }
  }

  fn begin_edit(&mut self) -> Result<(), InvoiceError> {
    if self.phase == DraftPhase::Finalizing {
      return Err(InvoiceError::FinalizeInProgress);
    }
    self.phase = DraftPhase::Composing;
    Ok(())
  }

  fn position(&self, local_id: LineItemId) -> Result<usize, InvoiceError> {
    self
      .line_items
      .iter()
      .position(|i| i.local_id == local_id)
      .ok_or(InvoiceError::LineItemNotFound(local_id.value()))
  }

  fn allocate_id(&mut self) -> LineItemId {
    let id = LineItemId(self.next_local_id);
    self.next_local_id += 1;
    id
  }
}

fn resolve_item(line: &DraftLineItem, refs: &ReferenceData) -> InvoiceItem {
  let product_id = line.product_id.clone().unwrap_or_default();
  let product = line.product_id.as_deref().and_then(|id| refs.find_product(id));
  if product.is_none() && line.has_product() {
    tracing::warn!(product_id = %product_id, "Product missing from registry, using placeholder");
  }

  InvoiceItem {
    product_name: product
      .map(|p| p.name.clone())
      .unwrap_or_else(|| PLACEHOLDER_PRODUCT_NAME.to_string()),
    hsn_code: product
      .map(|p| p.hsn_code.as_str().to_string())
      .unwrap_or_else(|| HsnCode::GENERIC.to_string()),
    product_id,
    quantity: line.quantity,
    rate: line.rate.value(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::registry::{AgencyProfile, Gstin, MobileNumber, Product};
  use rust_decimal_macros::dec;

  fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
  }

  fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_700_000, 0).unwrap()
  }

  fn draft() -> DraftInvoice {
    DraftInvoice::new(InvoiceNumber::seed("ARYA", 1_760_700_000_123), date())
  }

  fn refs() -> ReferenceData {
    let mut refs = ReferenceData::new(AgencyProfile {
      name: "ARYA CEMENT AGENCY".to_string(),
      address: "Main Road".to_string(),
      gstin: "07AABCA1234Z1Z1".to_string(),
      phone: "9876543210".to_string(),
      tagline: "Authorized Dealer".to_string(),
    });
    let mut product = Product::new("UltraTech PPC".to_string(), HsnCode::generic());
    product.id = "p1".to_string();
    refs.products.push(product);
    let mut product = Product::new(
      "TMT Bar".to_string(),
      HsnCode::new(Some("7214".to_string())).unwrap(),
    );
    product.id = "p2".to_string();
    refs.products.push(product);

    let mut customer = Customer::new(
      "Sharma Builders".to_string(),
      Some(MobileNumber::new("9811111111").unwrap()),
      Gstin::unregistered(),
      "Sector 5, Rohini".to_string(),
      now(),
    );
    customer.id = "c1".to_string();
    refs.customers.push(customer);
    refs
  }

  fn composed() -> DraftInvoice {
    let mut draft = draft();
    let first = draft.line_items()[0].local_id;
    draft
      .edit_line_item(
        first,
        LineItemPatch::product("p1")
          .quantity(10)
          .rate(Rate::new(dec!(350)).unwrap()),
      )
      .unwrap();
    let second = draft.add_line_item().unwrap();
    draft
      .edit_line_item(
        second,
        LineItemPatch::product("p2")
          .quantity(5)
          .rate(Rate::new(dec!(400)).unwrap()),
      )
      .unwrap();
    draft.set_customer(Some("c1".to_string())).unwrap();
    draft
  }

  #[test]
  fn test_new_draft_is_empty_with_placeholder_line() {
    let draft = draft();
    assert_eq!(draft.phase(), DraftPhase::Empty);
    assert_eq!(draft.invoice_number(), "ARYA-000123");
    assert_eq!(draft.line_items().len(), 1);
    let line = &draft.line_items()[0];
    assert_eq!(line.quantity, 1);
    assert_eq!(line.rate, Rate::zero());
    assert!(line.product_id.is_none());
  }

  #[test]
  fn test_add_line_item_uses_fresh_ids() {
    let mut draft = draft();
    let a = draft.add_line_item().unwrap();
    let b = draft.add_line_item().unwrap();
    assert_ne!(a, b);
    assert_eq!(draft.phase(), DraftPhase::Composing);
    assert_eq!(draft.line_items().len(), 3);
  }

  #[test]
  fn test_remove_line_item_may_empty_draft() {
    let mut draft = draft();
    let only = draft.line_items()[0].local_id;
    draft.remove_line_item(only).unwrap();
    assert!(draft.line_items().is_empty());
    assert!(matches!(
      draft.remove_line_item(only),
      Err(InvoiceError::LineItemNotFound(_))
    ));
  }

  #[test]
  fn test_live_totals_follow_edits() {
    let mut draft = composed();
    assert_eq!(draft.totals().total, dec!(6490));

    let first = draft.line_items()[0].local_id;
    draft.remove_line_item(first).unwrap();
    assert_eq!(draft.totals().subtotal, dec!(2000));
  }

  #[test]
  fn test_finalize_requires_customer() {
    let mut draft = composed();
    draft.set_customer(None).unwrap();
    let before = draft.clone();

    let result = draft.begin_finalize(&refs(), now());
    assert!(matches!(result, Err(InvoiceError::NoCustomerSelected)));
    assert_eq!(draft.phase(), DraftPhase::Composing);
    assert_eq!(draft, before);
  }

  #[test]
  fn test_finalize_requires_line_items() {
    let mut draft = composed();
    let ids: Vec<_> = draft.line_items().iter().map(|i| i.local_id).collect();
    for id in ids {
      draft.remove_line_item(id).unwrap();
    }
    assert_eq!(draft.totals(), InvoiceTotals::default());
    assert!(matches!(
      draft.begin_finalize(&refs(), now()),
      Err(InvoiceError::NoLineItems)
    ));
  }

  #[test]
  fn test_finalize_requires_a_product_selection() {
    let mut draft = draft();
    draft.set_customer(Some("c1".to_string())).unwrap();
    assert!(matches!(
      draft.begin_finalize(&refs(), now()),
      Err(InvoiceError::NoProductSelected)
    ));
  }

  #[test]
  fn test_finalize_rejects_deleted_customer() {
    let mut draft = composed();
    let mut refs = refs();
    refs.customers.clear();
    let result = draft.begin_finalize(&refs, now());
    assert!(matches!(result, Err(InvoiceError::CustomerNotFound(id)) if id == "c1"));
  }

  #[test]
  fn test_finalize_rejects_blank_invoice_number() {
    let mut draft = composed();
    draft.set_invoice_number("   ".to_string()).unwrap();
    let result = draft.begin_finalize(&refs(), now());
    assert!(matches!(result, Err(InvoiceError::Validation(_))));
  }

  #[test]
  fn test_begin_finalize_builds_denormalized_snapshot() {
    let mut draft = composed();
    draft
      .set_transport(Transport::new("DL01AB1234", "Gupta Roadways"))
      .unwrap();
    let snapshot = draft.begin_finalize(&refs(), now()).unwrap().unwrap();

    assert_eq!(draft.phase(), DraftPhase::Finalizing);
    assert_eq!(snapshot.invoice_number, "ARYA-000123");
    assert_eq!(snapshot.customer_name, "Sharma Builders");
    assert_eq!(snapshot.customer_mobile, "9811111111");
    assert_eq!(snapshot.customer_gstin, "URP");
    assert_eq!(snapshot.agency_snapshot.name, "ARYA CEMENT AGENCY");
    assert_eq!(snapshot.items[0].product_name, "UltraTech PPC");
    assert_eq!(snapshot.items[1].hsn_code, "7214");
    assert_eq!(snapshot.totals.total, dec!(6490));
    assert_eq!(snapshot.filing_path.value(), "2026/October");
    assert_eq!(snapshot.created_at, now());
    assert!(snapshot.transport.is_present());
  }

  #[test]
  fn test_missing_product_degrades_to_placeholder() {
    let mut draft = composed();
    let mut refs = refs();
    refs.products.retain(|p| p.id != "p2");

    let snapshot = draft.begin_finalize(&refs, now()).unwrap().unwrap();
    assert_eq!(snapshot.items[1].product_id, "p2");
    assert_eq!(snapshot.items[1].product_name, PLACEHOLDER_PRODUCT_NAME);
    assert_eq!(snapshot.items[1].hsn_code, "2523");
  }

  #[test]
  fn test_finalizing_guard() {
    let mut draft = composed();
    assert!(draft.begin_finalize(&refs(), now()).unwrap().is_some());

    assert!(draft.begin_finalize(&refs(), now()).unwrap().is_none());
    assert!(matches!(
      draft.add_line_item(),
      Err(InvoiceError::FinalizeInProgress)
    ));
    assert!(matches!(
      draft.set_customer(None),
      Err(InvoiceError::FinalizeInProgress)
    ));
    assert_eq!(draft.phase(), DraftPhase::Finalizing);
  }

  #[test]
  fn test_complete_finalize_resets() {
    let mut draft = composed();
    let old_ids: Vec<_> = draft.line_items().iter().map(|i| i.local_id).collect();
    draft.begin_finalize(&refs(), now()).unwrap();

    let tomorrow = date().succ_opt().unwrap();
    draft.complete_finalize(InvoiceNumber::seed("ARYA", 999_999), tomorrow);

    assert_eq!(draft.phase(), DraftPhase::Empty);
    assert_eq!(draft.invoice_number(), "ARYA-999999");
    assert_eq!(draft.date(), tomorrow);
    assert!(draft.customer_id().is_none());
    assert!(!draft.transport().is_present());
    assert_eq!(draft.line_items().len(), 1);
    assert!(!old_ids.contains(&draft.line_items()[0].local_id));
  }

  #[test]
  fn test_abort_finalize_keeps_fields() {
    let mut draft = composed();
    draft.begin_finalize(&refs(), now()).unwrap();
    draft.abort_finalize();

    assert_eq!(draft.phase(), DraftPhase::Composing);
    assert_eq!(draft.customer_id(), Some("c1"));
    assert_eq!(draft.line_items().len(), 2);
    assert!(draft.add_line_item().is_ok());
  }

  #[test]
  fn test_preview_tolerates_missing_customer() {
    let draft = draft();
    let preview = draft.preview(&refs(), now());
    assert_eq!(preview.customer_name, "");
    assert_eq!(preview.items.len(), 1);
    assert_eq!(preview.items[0].product_name, PLACEHOLDER_PRODUCT_NAME);
    assert_eq!(preview.totals, InvoiceTotals::default());
  }
}
