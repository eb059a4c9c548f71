use serde::Deserialize;
use std::sync::Arc;

use crate::domain::registry::RegistryError;
use crate::domain::store::{Collection, DocumentStore};

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProductCommand {
  pub product_id: String,
}

/// Removes a product from the registry. Invoices keep their copies.
pub struct DeleteProductUseCase {
  store: Arc<dyn DocumentStore>,
}

impl DeleteProductUseCase {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  pub async fn execute(&self, command: DeleteProductCommand) -> Result<(), RegistryError> {
    let product_id = command.product_id.trim();
    if product_id.is_empty() {
      return Err(RegistryError::InvalidInput(
        "Product id is required".to_string(),
      ));
    }

    self
      .store
      .delete(Collection::Products, product_id)
      .await
      .map_err(RegistryError::persistence("delete product"))?;

    tracing::info!(product_id = %product_id, "Product deleted");
    Ok(())
  }
}
