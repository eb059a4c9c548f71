use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use super::journal::JsonFileJournal;
use crate::domain::store::{
  Collection, DocumentStore, Snapshot, SnapshotStream, StoreError, StoredDocument,
};

struct CollectionSlot {
  /// Serializes writers so a journal write and its commit are not interleaved
  write_lock: Mutex<()>,
  current: watch::Sender<Arc<Snapshot>>,
}

impl CollectionSlot {
  fn new(initial: Snapshot) -> Self {
    let (current, _) = watch::channel(Arc::new(initial));
    Self {
      write_lock: Mutex::new(()),
      current,
    }
  }
}

/// Synchronized store kept in process memory.
///
/// Every subscriber receives the full collection on subscribe and again after
/// each committed write. With a journal attached, writes reach disk before
/// they are published; a failed disk write leaves the collection unchanged.
pub struct InMemoryDocumentStore {
  slots: HashMap<Collection, CollectionSlot>,
  journal: Option<JsonFileJournal>,
}

impl InMemoryDocumentStore {
  pub fn new() -> Self {
    Self {
      slots: Collection::ALL
        .into_iter()
        .map(|c| (c, CollectionSlot::new(Snapshot::new())))
        .collect(),
      journal: None,
    }
  }

  /// Store backed by `journal`, preloaded with what it already holds
  pub async fn with_journal(journal: JsonFileJournal) -> Result<Self, StoreError> {
    let mut slots = HashMap::new();
    for collection in Collection::ALL {
      let snapshot = journal.load(collection).await?;
      tracing::info!(
        collection = %collection,
        documents = snapshot.len(),
        "Loaded collection from journal"
      );
      slots.insert(collection, CollectionSlot::new(snapshot));
    }

    Ok(Self {
      slots,
      journal: Some(journal),
    })
  }

  fn slot(&self, collection: Collection) -> Result<&CollectionSlot, StoreError> {
    self
      .slots
      .get(&collection)
      .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
  }

  async fn mutate<R, F>(&self, collection: Collection, apply: F) -> Result<R, StoreError>
  where
    F: FnOnce(&mut Snapshot) -> Result<R, StoreError> + Send,
    R: Send,
  {
    let slot = self.slot(collection)?;
    let _guard = slot.write_lock.lock().await;

    let mut next: Snapshot = slot.current.borrow().as_ref().clone();
    let result = apply(&mut next)?;

    if let Some(journal) = &self.journal {
      journal.persist(collection, &next).await?;
    }
    slot.current.send_replace(Arc::new(next));
    Ok(result)
  }
}

impl Default for InMemoryDocumentStore {
  fn default() -> Self {
    Self::new()
  }
}

fn require_object(value: Value) -> Result<serde_json::Map<String, Value>, StoreError> {
  match value {
    Value::Object(mut map) => {
      // The id lives beside the record, never inside it
      map.remove("id");
      Ok(map)
    }
    _ => Err(StoreError::InvalidDocument(
      "record must be a JSON object".to_string(),
    )),
  }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
  async fn subscribe(&self, collection: Collection) -> Result<SnapshotStream, StoreError> {
    let receiver = self.slot(collection)?.current.subscribe();

    let stream = futures_util::stream::unfold((receiver, true), |(mut rx, first)| async move {
      if !first && rx.changed().await.is_err() {
        return None;
      }
      let snapshot = rx.borrow_and_update().as_ref().clone();
      Some((snapshot, (rx, false)))
    });

    Ok(stream.boxed())
  }

  async fn create(&self, collection: Collection, record: Value) -> Result<String, StoreError> {
    let data = Value::Object(require_object(record)?);
    let id = Uuid::new_v4().simple().to_string();

    let created = id.clone();
    self
      .mutate(collection, move |docs| {
        docs.push(StoredDocument::new(created, data));
        Ok(())
      })
      .await?;

    tracing::debug!(collection = %collection, id = %id, "Document created");
    Ok(id)
  }

  async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
    let patch = require_object(patch)?;
    let id = id.to_string();

    self
      .mutate(collection, move |docs| {
        let doc = docs
          .iter_mut()
          .find(|d| d.id == id)
          .ok_or_else(|| StoreError::NotFound {
            collection,
            id: id.clone(),
          })?;
        match &mut doc.data {
          Value::Object(existing) => existing.extend(patch),
          other => *other = Value::Object(patch),
        }
        Ok(())
      })
      .await
  }

  async fn replace(&self, collection: Collection, id: &str, record: Value) -> Result<(), StoreError> {
    let data = Value::Object(require_object(record)?);
    let id = id.to_string();

    self
      .mutate(collection, move |docs| {
        match docs.iter_mut().find(|d| d.id == id) {
          Some(doc) => doc.data = data,
          None => docs.push(StoredDocument::new(id, data)),
        }
        Ok(())
      })
      .await
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
    let id = id.to_string();
    self
      .mutate(collection, move |docs| {
        docs.retain(|d| d.id != id);
        Ok(())
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::time::Duration;

  async fn next(stream: &mut SnapshotStream) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(1), stream.next())
      .await
      .expect("snapshot not delivered")
      .expect("stream ended")
  }

  #[tokio::test]
  async fn test_subscribe_delivers_current_contents_first() {
    let store = InMemoryDocumentStore::new();
    store
      .create(Collection::Products, json!({ "name": "PPC" }))
      .await
      .unwrap();

    let mut stream = store.subscribe(Collection::Products).await.unwrap();
    let snapshot = next(&mut stream).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].data["name"], "PPC");
  }

  #[tokio::test]
  async fn test_writes_push_new_snapshots() {
    let store = InMemoryDocumentStore::new();
    let mut stream = store.subscribe(Collection::Customers).await.unwrap();
    assert!(next(&mut stream).await.is_empty());

    let id = store
      .create(Collection::Customers, json!({ "name": "Sharma" }))
      .await
      .unwrap();
    assert_eq!(next(&mut stream).await[0].id, id);

    store.delete(Collection::Customers, &id).await.unwrap();
    assert!(next(&mut stream).await.is_empty());
  }

  #[tokio::test]
  async fn test_collections_are_independent() {
    let store = InMemoryDocumentStore::new();
    let mut products = store.subscribe(Collection::Products).await.unwrap();
    next(&mut products).await;

    store
      .create(Collection::Bills, json!({ "invoiceNumber": "A-1" }))
      .await
      .unwrap();

    let pending = tokio::time::timeout(Duration::from_millis(50), products.next()).await;
    assert!(pending.is_err());
  }

  #[tokio::test]
  async fn test_update_is_a_shallow_merge() {
    let store = InMemoryDocumentStore::new();
    let id = store
      .create(
        Collection::Customers,
        json!({ "name": "Sharma", "address": { "city": "Delhi" }, "gstin": "URP" }),
      )
      .await
      .unwrap();

    store
      .update(
        Collection::Customers,
        &id,
        json!({ "address": { "street": "Main" }, "mobile": "9811111111" }),
      )
      .await
      .unwrap();

    let mut stream = store.subscribe(Collection::Customers).await.unwrap();
    let data = next(&mut stream).await[0].data.clone();
    assert_eq!(data["name"], "Sharma");
    assert_eq!(data["address"], json!({ "street": "Main" }));
    assert_eq!(data["mobile"], "9811111111");
  }

  #[tokio::test]
  async fn test_update_missing_document() {
    let store = InMemoryDocumentStore::new();
    let result = store
      .update(Collection::Customers, "nope", json!({ "name": "x" }))
      .await;
    match result {
      Err(StoreError::NotFound { collection, id }) => {
        assert_eq!(collection, Collection::Customers);
        assert_eq!(id, "nope");
      }
      other => panic!("expected NotFound, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_replace_upserts() {
    let store = InMemoryDocumentStore::new();
    store
      .replace(Collection::Agency, "profile", json!({ "name": "A" }))
      .await
      .unwrap();
    store
      .replace(Collection::Agency, "profile", json!({ "name": "B" }))
      .await
      .unwrap();

    let mut stream = store.subscribe(Collection::Agency).await.unwrap();
    let snapshot = next(&mut stream).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "profile");
    assert_eq!(snapshot[0].data, json!({ "name": "B" }));
  }

  #[tokio::test]
  async fn test_rejects_non_object_records() {
    let store = InMemoryDocumentStore::new();
    let result = store.create(Collection::Products, json!("PPC")).await;
    assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
  }

  #[tokio::test]
  async fn test_journal_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryDocumentStore::with_journal(JsonFileJournal::new(dir.path()))
      .await
      .unwrap();
    let id = store
      .create(Collection::Products, json!({ "name": "PPC" }))
      .await
      .unwrap();
    drop(store);

    let reopened = InMemoryDocumentStore::with_journal(JsonFileJournal::new(dir.path()))
      .await
      .unwrap();
    let mut stream = reopened.subscribe(Collection::Products).await.unwrap();
    assert_eq!(next(&mut stream).await[0].id, id);
  }

  #[tokio::test]
  async fn test_failed_journal_write_leaves_collection_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = InMemoryDocumentStore::with_journal(JsonFileJournal::new(&data_dir))
      .await
      .unwrap();
    std::fs::write(&data_dir, b"blocked").unwrap();

    let result = store
      .create(Collection::Bills, json!({ "invoiceNumber": "A-1" }))
      .await;
    assert!(matches!(result, Err(StoreError::Io(_))));

    let mut stream = store.subscribe(Collection::Bills).await.unwrap();
    assert!(next(&mut stream).await.is_empty());
  }
}
