use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::domain::invoice::Invoice;
use crate::domain::registry::{AgencyProfile, Customer, Product, ReferenceData};
use crate::domain::store::{
  AGENCY_PROFILE_KEY, Collection, DocumentStore, Snapshot, SnapshotStream, StoreError,
};

/// Keeps local copies of the shared collections up to date.
///
/// One background task follows each collection. Every task shares a single
/// cancellation token, so the four subscriptions stop together.
pub struct SyncCoordinator;

impl SyncCoordinator {
  /// Subscribe to every collection and start applying snapshots.
  ///
  /// `default_agency` stands in until a stored profile arrives. Fails without
  /// starting anything when any subscription is refused.
  pub async fn start(
    store: Arc<dyn DocumentStore>,
    default_agency: AgencyProfile,
  ) -> Result<SyncHandle, StoreError> {
    let products = store.subscribe(Collection::Products).await?;
    let customers = store.subscribe(Collection::Customers).await?;
    let agency = store.subscribe(Collection::Agency).await?;
    let bills = store.subscribe(Collection::Bills).await?;

    let (reference_tx, reference_rx) = watch::channel(Arc::new(ReferenceData::new(default_agency)));
    let (invoices_tx, invoices_rx) = watch::channel(Arc::new(Vec::<Invoice>::new()));
    let reference_tx = Arc::new(reference_tx);
    let (synced_tx, synced_rx) = watch::channel(0usize);
    let synced_tx = Arc::new(synced_tx);
    let shutdown_token = CancellationToken::new();
    let mut tasks = JoinSet::new();

    let tx = reference_tx.clone();
    tasks.spawn(follow(
      Collection::Products,
      products,
      shutdown_token.clone(),
      synced_tx.clone(),
      move |snapshot| {
        let products: Vec<Product> = decode_all(Collection::Products, &snapshot);
        tx.send_modify(|refs| Arc::make_mut(refs).products = products);
      },
    ));

    let tx = reference_tx.clone();
    tasks.spawn(follow(
      Collection::Customers,
      customers,
      shutdown_token.clone(),
      synced_tx.clone(),
      move |snapshot| {
        let customers: Vec<Customer> = decode_all(Collection::Customers, &snapshot);
        tx.send_modify(|refs| Arc::make_mut(refs).customers = customers);
      },
    ));

    let tx = reference_tx;
    tasks.spawn(follow(
      Collection::Agency,
      agency,
      shutdown_token.clone(),
      synced_tx.clone(),
      move |snapshot| {
        if let Some(profile) = decode_agency(&snapshot) {
          tx.send_modify(|refs| Arc::make_mut(refs).agency = profile);
        }
      },
    ));

    tasks.spawn(follow(
      Collection::Bills,
      bills,
      shutdown_token.clone(),
      synced_tx.clone(),
      move |snapshot| {
        let invoices: Vec<Invoice> = decode_all(Collection::Bills, &snapshot);
        invoices_tx.send_replace(Arc::new(invoices));
      },
    ));

    tracing::info!("Reference data sync started");

    Ok(SyncHandle {
      reference: reference_rx,
      invoices: invoices_rx,
      synced: synced_rx,
      shutdown_token,
      tasks,
    })
  }
}

/// Read side of a running sync plus its lifecycle.
///
/// Dropping the handle cancels the background tasks.
pub struct SyncHandle {
  reference: watch::Receiver<Arc<ReferenceData>>,
  invoices: watch::Receiver<Arc<Vec<Invoice>>>,
  /// Number of collections whose first snapshot has been applied
  synced: watch::Receiver<usize>,
  shutdown_token: CancellationToken,
  tasks: JoinSet<()>,
}

impl SyncHandle {
  /// Latest products, customers and agency profile
  pub fn reference_data(&self) -> Arc<ReferenceData> {
    self.reference.borrow().clone()
  }

  /// Latest persisted invoices, in store order
  pub fn invoices(&self) -> Arc<Vec<Invoice>> {
    self.invoices.borrow().clone()
  }

  /// Receiver that can await reference data changes
  pub fn watch_reference(&self) -> watch::Receiver<Arc<ReferenceData>> {
    self.reference.clone()
  }

  pub fn watch_invoices(&self) -> watch::Receiver<Arc<Vec<Invoice>>> {
    self.invoices.clone()
  }

  /// Wait until every collection has delivered its first snapshot.
  /// Returns false when the sync stopped first.
  pub async fn synced(&self) -> bool {
    let mut synced = self.synced.clone();
    synced
      .wait_for(|count| *count >= Collection::ALL.len())
      .await
      .is_ok()
  }

  pub fn is_running(&self) -> bool {
    !self.shutdown_token.is_cancelled()
  }

  /// Stop every subscription and wait for the tasks to finish
  pub async fn shutdown(mut self) {
    self.shutdown_token.cancel();
    let mut tasks = std::mem::take(&mut self.tasks);
    while let Some(result) = tasks.join_next().await {
      if let Err(e) = result {
        tracing::error!("Sync task failed: {}", e);
      }
    }
    tracing::info!("Reference data sync stopped");
  }
}

impl Drop for SyncHandle {
  fn drop(&mut self) {
    self.shutdown_token.cancel();
  }
}

async fn follow<F>(
  collection: Collection,
  mut stream: SnapshotStream,
  shutdown_token: CancellationToken,
  synced: Arc<watch::Sender<usize>>,
  mut apply: F,
) where
  F: FnMut(Snapshot) + Send + 'static,
{
  let mut first = true;
  loop {
    tokio::select! {
      _ = shutdown_token.cancelled() => {
        tracing::debug!(collection = %collection, "Subscription cancelled");
        break;
      }
      next = stream.next() => match next {
        Some(snapshot) => {
          tracing::debug!(
            collection = %collection,
            documents = snapshot.len(),
            "Applying snapshot"
          );
          apply(snapshot);
          if first {
            first = false;
            synced.send_modify(|count| *count += 1);
          }
        }
        None => {
          tracing::warn!(collection = %collection, "Snapshot stream ended");
          break;
        }
      }
    }
  }
}

/// Decode every document, skipping the ones that do not fit `T`
fn decode_all<T: DeserializeOwned>(collection: Collection, snapshot: &Snapshot) -> Vec<T> {
  snapshot
    .iter()
    .filter_map(|doc| match doc.decode::<T>() {
      Ok(entity) => Some(entity),
      Err(e) => {
        tracing::warn!(
          collection = %collection,
          id = %doc.id,
          "Skipping undecodable document: {}",
          e
        );
        None
      }
    })
    .collect()
}

fn decode_agency(snapshot: &Snapshot) -> Option<AgencyProfile> {
  let doc = snapshot.iter().find(|d| d.id == AGENCY_PROFILE_KEY)?;
  match serde_json::from_value::<AgencyProfile>(doc.data.clone()) {
    Ok(profile) => Some(profile),
    Err(e) => {
      tracing::warn!("Skipping undecodable agency profile: {}", e);
      None
    }
  }
}
