use thiserror::Error;

use super::ports::Collection;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Document not found: {collection}/{id}")]
  NotFound { collection: Collection, id: String },

  #[error("Unknown collection: {0}")]
  UnknownCollection(String),

  #[error("Invalid document: {0}")]
  InvalidDocument(String),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}
