use thiserror::Error;

use super::value_objects::ValidationError;
use crate::domain::store::StoreError;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Customer not found: {0}")]
  CustomerNotFound(String),

  #[error("Failed to {operation}: {source}")]
  Persistence {
    operation: &'static str,
    #[source]
    source: StoreError,
  },

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl RegistryError {
  pub fn persistence(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
    move |source| RegistryError::Persistence { operation, source }
  }
}

/// Flatten validator crate errors into one message
impl From<validator::ValidationErrors> for RegistryError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();
    messages.sort();

    RegistryError::InvalidInput(messages.join(", "))
  }
}
