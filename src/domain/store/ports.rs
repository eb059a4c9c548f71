use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::errors::StoreError;

/// Key of the agency profile document inside the `agency` collection
pub const AGENCY_PROFILE_KEY: &str = "profile";

/// Logical collections kept by the synchronized store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  Products,
  Customers,
  Bills,
  Agency,
}

impl Collection {
  pub const ALL: [Collection; 4] = [
    Collection::Products,
    Collection::Customers,
    Collection::Bills,
    Collection::Agency,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Collection::Products => "products",
      Collection::Customers => "customers",
      Collection::Bills => "bills",
      Collection::Agency => "agency",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Collection {
  type Err = StoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "products" => Ok(Collection::Products),
      "customers" => Ok(Collection::Customers),
      "bills" => Ok(Collection::Bills),
      "agency" => Ok(Collection::Agency),
      _ => Err(StoreError::UnknownCollection(s.to_string())),
    }
  }
}

/// A stored record together with its store-assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
  pub id: String,
  pub data: Value,
}

impl StoredDocument {
  pub fn new(id: impl Into<String>, data: Value) -> Self {
    Self {
      id: id.into(),
      data,
    }
  }

  /// Decode the document into an entity. The store id is injected as the
  /// `id` field so entities can carry it.
  pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
    let mut data = match &self.data {
      Value::Object(map) => map.clone(),
      _ => {
        return Err(StoreError::InvalidDocument(format!(
          "document {} is not an object",
          self.id
        )));
      }
    };
    data.insert("id".to_string(), Value::String(self.id.clone()));
    Ok(serde_json::from_value(Value::Object(data))?)
  }
}

/// Full contents of one collection at a point in time
pub type Snapshot = Vec<StoredDocument>;

/// Push stream of full-collection snapshots. The first item is the current
/// contents; every later item follows a change.
pub type SnapshotStream = BoxStream<'static, Snapshot>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
  async fn subscribe(&self, collection: Collection) -> Result<SnapshotStream, StoreError>;

  /// Insert a new record and return the id assigned by the store
  async fn create(&self, collection: Collection, record: Value) -> Result<String, StoreError>;

  /// Shallow-merge `patch` into the top-level keys of an existing record
  async fn update(&self, collection: Collection, id: &str, patch: Value)
  -> Result<(), StoreError>;

  /// Write `record` under `id`, overwriting any existing record
  async fn replace(&self, collection: Collection, id: &str, record: Value)
  -> Result<(), StoreError>;

  async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}
