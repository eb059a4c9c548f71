use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::domain::registry::value_objects::required_text;
use crate::domain::registry::{HsnCode, Product, RegistryError};
use crate::domain::store::{Collection, DocumentStore};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddProductCommand {
  #[validate(length(
    min = 1,
    max = 200,
    message = "Product name must be between 1 and 200 characters"
  ))]
  pub name: String,
  /// Blank or missing falls back to the generic cement code
  #[serde(default)]
  pub hsn_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddProductResponse {
  pub product_id: String,
  pub name: String,
  pub hsn_code: String,
}

pub struct AddProductUseCase {
  store: Arc<dyn DocumentStore>,
}

impl AddProductUseCase {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  pub async fn execute(&self, command: AddProductCommand) -> Result<AddProductResponse, RegistryError> {
    command.validate()?;
    let name = required_text(command.name, "Product name", 200)?;
    let hsn_code = HsnCode::new(command.hsn_code)?;

    let product = Product::new(name, hsn_code);
    let record = serde_json::to_value(&product)?;
    let product_id = self
      .store
      .create(Collection::Products, record)
      .await
      .map_err(RegistryError::persistence("add product"))?;

    tracing::info!(product_id = %product_id, name = %product.name, "Product added");

    Ok(AddProductResponse {
      product_id,
      name: product.name,
      hsn_code: product.hsn_code.as_str().to_string(),
    })
  }
}
