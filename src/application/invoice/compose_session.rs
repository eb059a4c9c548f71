use chrono::{Local, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::domain::invoice::{
  DraftInvoice, Invoice, InvoiceError, InvoiceNumber, InvoiceSnapshot, InvoiceTotals, LineItemId,
  LineItemPatch, Transport,
};
use crate::domain::registry::ReferenceData;
use crate::domain::store::{Collection, DocumentStore};

/// Result of a finalize request
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
  /// The invoice was written; the draft now holds fresh values
  Finalized(Invoice),
  /// Another finalize is still running; nothing was done
  AlreadyInFlight,
}

/// One operator's draft and the only path that turns it into an invoice.
///
/// Edits are synchronous and never wait on the store. Reference data is read
/// from the sync receiver only when a preview or finalize needs it.
pub struct ComposingSession {
  draft: Mutex<DraftInvoice>,
  store: Arc<dyn DocumentStore>,
  reference: watch::Receiver<Arc<ReferenceData>>,
  number_prefix: String,
  closed: AtomicBool,
}

impl ComposingSession {
  pub fn new(
    store: Arc<dyn DocumentStore>,
    reference: watch::Receiver<Arc<ReferenceData>>,
    number_prefix: impl Into<String>,
  ) -> Self {
    let number_prefix = number_prefix.into();
    let draft = DraftInvoice::new(next_number(&number_prefix), today());

    Self {
      draft: Mutex::new(draft),
      store,
      reference,
      number_prefix,
      closed: AtomicBool::new(false),
    }
  }

  /// Copy of the draft as it is right now
  pub fn draft(&self) -> DraftInvoice {
    self.lock().clone()
  }

  pub fn totals(&self) -> InvoiceTotals {
    self.lock().totals()
  }

  pub fn add_line_item(&self) -> Result<LineItemId, InvoiceError> {
    self.ensure_open()?;
    self.lock().add_line_item()
  }

  pub fn remove_line_item(&self, local_id: LineItemId) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().remove_line_item(local_id)
  }

  pub fn edit_line_item(&self, local_id: LineItemId, patch: LineItemPatch) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().edit_line_item(local_id, patch)
  }

  pub fn set_customer(&self, customer_id: Option<String>) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().set_customer(customer_id)
  }

  pub fn set_date(&self, date: NaiveDate) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().set_date(date)
  }

  pub fn set_transport(&self, transport: Transport) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().set_transport(transport)
  }

  pub fn set_invoice_number(&self, invoice_number: impl Into<String>) -> Result<(), InvoiceError> {
    self.ensure_open()?;
    self.lock().set_invoice_number(invoice_number.into())
  }

  /// What finalize would write, with unresolved references left blank
  pub fn preview(&self) -> InvoiceSnapshot {
    let refs = self.reference_data();
    self.lock().preview(&refs, Utc::now())
  }

  /// Validate, persist and reset.
  ///
  /// On a validation error or a store failure the draft keeps every field
  /// and can be finalized again.
  pub async fn finalize(&self) -> Result<FinalizeOutcome, InvoiceError> {
    self.ensure_open()?;
    let refs = self.reference_data();

    let begun = {
      let mut draft = self.lock();
      draft.begin_finalize(&refs, Utc::now())
    };
    let snapshot = match begun {
      Ok(Some(snapshot)) => snapshot,
      Ok(None) => {
        tracing::debug!("Finalize already in flight, ignoring");
        return Ok(FinalizeOutcome::AlreadyInFlight);
      }
      Err(e) => {
        tracing::debug!("Finalize rejected: {}", e);
        return Err(e);
      }
    };

    match self.persist(&snapshot).await {
      Ok(id) => {
        if !self.is_closed() {
          self
            .lock()
            .complete_finalize(next_number(&self.number_prefix), today());
        }
        tracing::info!(
          invoice_id = %id,
          invoice_number = %snapshot.invoice_number,
          total = %snapshot.totals.total,
          "Invoice finalized"
        );
        Ok(FinalizeOutcome::Finalized(Invoice::new(id, snapshot)))
      }
      Err(e) => {
        if !self.is_closed() {
          self.lock().abort_finalize();
        }
        tracing::error!(invoice_number = %snapshot.invoice_number, "Failed to finalize invoice: {}", e);
        Err(e)
      }
    }
  }

  /// End the session. A finalize still running completes but leaves the
  /// draft alone.
  pub fn close(&self) {
    self.closed.store(true, Ordering::SeqCst);
  }

  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }

  async fn persist(&self, snapshot: &InvoiceSnapshot) -> Result<String, InvoiceError> {
    let record = serde_json::to_value(snapshot)?;
    self
      .store
      .create(Collection::Bills, record)
      .await
      .map_err(|source| InvoiceError::Persistence {
        operation: "save invoice",
        source,
      })
  }

  fn reference_data(&self) -> Arc<ReferenceData> {
    self.reference.borrow().clone()
  }

  fn ensure_open(&self) -> Result<(), InvoiceError> {
    if self.is_closed() {
      return Err(InvoiceError::SessionClosed);
    }
    Ok(())
  }

  fn lock(&self) -> MutexGuard<'_, DraftInvoice> {
    self.draft.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn next_number(prefix: &str) -> InvoiceNumber {
  InvoiceNumber::seed(prefix, Utc::now().timestamp_millis())
}

fn today() -> NaiveDate {
  Local::now().date_naive()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{DraftPhase, Rate};
  use crate::domain::registry::{AgencyProfile, Customer, Gstin, HsnCode, Product};
  use crate::domain::store::{SnapshotStream, StoreError};
  use crate::infrastructure::store::InMemoryDocumentStore;
  use async_trait::async_trait;
  use futures_util::StreamExt;
  use rust_decimal_macros::dec;
  use serde_json::Value;
  use tokio::sync::Notify;

  /// Holds every `create` until released
  struct GatedStore {
    inner: InMemoryDocumentStore,
    gate: Notify,
  }

  #[async_trait]
  impl DocumentStore for GatedStore {
    async fn subscribe(&self, collection: Collection) -> Result<SnapshotStream, StoreError> {
      self.inner.subscribe(collection).await
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<String, StoreError> {
      self.gate.notified().await;
      self.inner.create(collection, record).await
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
      self.inner.update(collection, id, patch).await
    }

    async fn replace(&self, collection: Collection, id: &str, record: Value) -> Result<(), StoreError> {
      self.inner.replace(collection, id, record).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
      self.inner.delete(collection, id).await
    }
  }

  /// Refuses every write
  struct FailingStore;

  #[async_trait]
  impl DocumentStore for FailingStore {
    async fn subscribe(&self, _collection: Collection) -> Result<SnapshotStream, StoreError> {
      Ok(futures_util::stream::empty().boxed())
    }

    async fn create(&self, _collection: Collection, _record: Value) -> Result<String, StoreError> {
      Err(StoreError::Unavailable("offline".to_string()))
    }

    async fn update(&self, _: Collection, _: &str, _: Value) -> Result<(), StoreError> {
      Err(StoreError::Unavailable("offline".to_string()))
    }

    async fn replace(&self, _: Collection, _: &str, _: Value) -> Result<(), StoreError> {
      Err(StoreError::Unavailable("offline".to_string()))
    }

    async fn delete(&self, _: Collection, _: &str) -> Result<(), StoreError> {
      Err(StoreError::Unavailable("offline".to_string()))
    }
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
    let mut customer = Customer::new(
      "Sharma Builders".to_string(),
      None,
      Gstin::unregistered(),
      "Rohini".to_string(),
      Utc::now(),
    );
    customer.id = "c1".to_string();
    refs.customers.push(customer);
    refs
  }

  fn session(
    store: Arc<dyn DocumentStore>,
  ) -> (ComposingSession, watch::Sender<Arc<ReferenceData>>) {
    let (tx, rx) = watch::channel(Arc::new(refs()));
    (ComposingSession::new(store, rx, "ARYA"), tx)
  }

  fn compose(session: &ComposingSession) {
    let line = session.draft().line_items()[0].local_id;
    session
      .edit_line_item(
        line,
        LineItemPatch::product("p1")
          .quantity(10)
          .rate(Rate::new(dec!(350)).unwrap()),
      )
      .unwrap();
    session.set_customer(Some("c1".to_string())).unwrap();
  }

  async fn bill_count(store: &dyn DocumentStore) -> usize {
    let mut stream = store.subscribe(Collection::Bills).await.unwrap();
    stream.next().await.unwrap().len()
  }

  #[tokio::test]
  async fn test_new_session_has_seeded_draft() {
    let (session, _tx) = session(Arc::new(InMemoryDocumentStore::new()));
    let draft = session.draft();
    assert!(draft.invoice_number().starts_with("ARYA-"));
    assert_eq!(draft.invoice_number().len(), "ARYA-".len() + 6);
    assert_eq!(draft.phase(), DraftPhase::Empty);
    assert_eq!(draft.date(), today());
  }

  #[tokio::test]
  async fn test_finalize_persists_and_resets() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (session, _tx) = session(store.clone());
    compose(&session);
    session.set_invoice_number("ARYA-000777").unwrap();
    assert_eq!(session.totals().total, dec!(4130));

    let outcome = session.finalize().await.unwrap();
    let FinalizeOutcome::Finalized(invoice) = outcome else {
      panic!("expected a finalized invoice");
    };
    assert!(!invoice.id.is_empty());
    assert_eq!(invoice.snapshot.invoice_number, "ARYA-000777");
    assert_eq!(invoice.snapshot.customer_name, "Sharma Builders");
    assert_eq!(invoice.snapshot.totals.total, dec!(4130));
    assert_eq!(bill_count(store.as_ref()).await, 1);

    let draft = session.draft();
    assert_eq!(draft.phase(), DraftPhase::Empty);
    assert!(draft.customer_id().is_none());
    assert_eq!(draft.line_items().len(), 1);
    assert_eq!(session.totals(), InvoiceTotals::default());
  }

  #[tokio::test]
  async fn test_finalize_without_customer_writes_nothing() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (session, _tx) = session(store.clone());
    compose(&session);
    session.set_customer(None).unwrap();
    let before = session.draft();

    let result = session.finalize().await;
    assert!(matches!(result, Err(InvoiceError::NoCustomerSelected)));
    assert_eq!(bill_count(store.as_ref()).await, 0);
    assert_eq!(session.draft(), before);
  }

  #[tokio::test]
  async fn test_customer_deleted_mid_draft_fails_validation() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (session, tx) = session(store.clone());
    compose(&session);

    tx.send_modify(|refs| Arc::make_mut(refs).customers.clear());

    let result = session.finalize().await;
    assert!(matches!(&result, Err(e) if e.is_validation()));
    assert_eq!(bill_count(store.as_ref()).await, 0);
  }

  #[tokio::test]
  async fn test_store_failure_keeps_draft() {
    let (session, _tx) = session(Arc::new(FailingStore));
    compose(&session);
    let before = session.draft();

    let result = session.finalize().await;
    assert!(matches!(
      result,
      Err(InvoiceError::Persistence {
        operation: "save invoice",
        ..
      })
    ));
    let after = session.draft();
    assert_eq!(after.phase(), DraftPhase::Composing);
    assert_eq!(after.customer_id(), before.customer_id());
    assert_eq!(after.line_items(), before.line_items());
    assert_eq!(after.invoice_number(), before.invoice_number());

    // Manual retry is possible
    assert!(session.finalize().await.is_err());
  }

  #[tokio::test]
  async fn test_concurrent_finalize_writes_one_invoice() {
    let store = Arc::new(GatedStore {
      inner: InMemoryDocumentStore::new(),
      gate: Notify::new(),
    });
    let (session, _tx) = session(store.clone());
    let session = Arc::new(session);
    compose(&session);

    let first = tokio::spawn({
      let session = session.clone();
      async move { session.finalize().await }
    });
    while session.draft().phase() != DraftPhase::Finalizing {
      tokio::task::yield_now().await;
    }

    assert_eq!(
      session.finalize().await.unwrap(),
      FinalizeOutcome::AlreadyInFlight
    );
    assert!(matches!(
      session.add_line_item(),
      Err(InvoiceError::FinalizeInProgress)
    ));

    store.gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, FinalizeOutcome::Finalized(_)));
    assert_eq!(bill_count(&store.inner).await, 1);
    assert_eq!(session.draft().phase(), DraftPhase::Empty);
  }

  #[tokio::test]
  async fn test_closed_session_is_not_reset_by_inflight_finalize() {
    let store = Arc::new(GatedStore {
      inner: InMemoryDocumentStore::new(),
      gate: Notify::new(),
    });
    let (session, _tx) = session(store.clone());
    let session = Arc::new(session);
    compose(&session);

    let first = tokio::spawn({
      let session = session.clone();
      async move { session.finalize().await }
    });
    while session.draft().phase() != DraftPhase::Finalizing {
      tokio::task::yield_now().await;
    }
    session.close();
    store.gate.notify_one();

    assert!(matches!(
      first.await.unwrap().unwrap(),
      FinalizeOutcome::Finalized(_)
    ));
    let draft = session.draft();
    assert_eq!(draft.customer_id(), Some("c1"));
    assert!(matches!(
      session.set_customer(None),
      Err(InvoiceError::SessionClosed)
    ));
    assert!(matches!(
      session.finalize().await,
      Err(InvoiceError::SessionClosed)
    ));
  }

  #[tokio::test]
  async fn test_preview_follows_live_reference_data() {
    let (session, tx) = session(Arc::new(InMemoryDocumentStore::new()));
    compose(&session);
    assert_eq!(session.preview().items[0].product_name, "UltraTech PPC");

    tx.send_modify(|refs| Arc::make_mut(refs).products[0].name = "PPC Gold".to_string());
    assert_eq!(session.preview().items[0].product_name, "PPC Gold");
  }
}
