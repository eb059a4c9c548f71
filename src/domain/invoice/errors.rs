use thiserror::Error;

use super::value_objects::ValueObjectError;
use crate::domain::store::StoreError;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("No customer selected")]
  NoCustomerSelected,

  #[error("Customer not found: {0}")]
  CustomerNotFound(String),

  #[error("No line items provided")]
  NoLineItems,

  #[error("No line item has a product selected")]
  NoProductSelected,

  #[error("Line item not found: {0}")]
  LineItemNotFound(u64),

  #[error("Invoice is being finalized")]
  FinalizeInProgress,

  #[error("Composing session is closed")]
  SessionClosed,

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(String),

  #[error("Failed to {operation}: {source}")]
  Persistence {
    operation: &'static str,
    #[source]
    source: StoreError,
  },

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl InvoiceError {
  /// Errors the operator fixes by editing the draft
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      InvoiceError::Validation(_)
        | InvoiceError::NoCustomerSelected
        | InvoiceError::CustomerNotFound(_)
        | InvoiceError::NoLineItems
        | InvoiceError::NoProductSelected
    )
  }
}
