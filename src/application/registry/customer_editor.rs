use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use validator::Validate;

use crate::domain::registry::value_objects::required_text;
use crate::domain::registry::{Customer, Gstin, MobileNumber, ReferenceData, RegistryError};
use crate::domain::store::{Collection, DocumentStore};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SaveCustomerCommand {
  #[validate(length(
    min = 1,
    max = 200,
    message = "Customer name must be between 1 and 200 characters"
  ))]
  pub name: String,
  #[serde(default)]
  pub mobile: Option<String>,
  #[serde(default)]
  pub gstin: Option<String>,
  #[serde(default)]
  #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
  pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveCustomerResponse {
  pub customer_id: String,
  /// False when an existing customer was updated
  pub created: bool,
}

/// Customer form with an optional edit target.
///
/// While a customer is being edited, `save` updates it in place; otherwise
/// `save` creates a new customer.
pub struct CustomerEditor {
  store: Arc<dyn DocumentStore>,
  reference: watch::Receiver<Arc<ReferenceData>>,
  editing: Mutex<Option<String>>,
}

impl CustomerEditor {
  pub fn new(
    store: Arc<dyn DocumentStore>,
    reference: watch::Receiver<Arc<ReferenceData>>,
  ) -> Self {
    Self {
      store,
      reference,
      editing: Mutex::new(None),
    }
  }

  /// Id of the customer being edited, if any
  pub fn editing(&self) -> Option<String> {
    self.lock().clone()
  }

  /// Make `customer_id` the edit target and return its current values
  pub fn begin_edit(&self, customer_id: &str) -> Result<Customer, RegistryError> {
    let customer = self
      .reference
      .borrow()
      .find_customer(customer_id)
      .cloned()
      .ok_or_else(|| RegistryError::CustomerNotFound(customer_id.to_string()))?;

    *self.lock() = Some(customer.id.clone());
    tracing::debug!(customer_id = %customer.id, "Editing customer");
    Ok(customer)
  }

  pub fn cancel_edit(&self) {
    self.lock().take();
  }

  pub async fn save(&self, command: SaveCustomerCommand) -> Result<SaveCustomerResponse, RegistryError> {
    command.validate()?;
    let name = required_text(command.name, "Customer name", 200)?;
    let mobile = match command.mobile.as_deref().map(str::trim) {
      Some(m) if !m.is_empty() => Some(MobileNumber::new(m)?),
      _ => None,
    };
    let gstin = Gstin::new(command.gstin)?;
    let address = command.address.trim().to_string();
    let now = Utc::now();

    // Read the target up front; the lock is never held across the store call
    let target = self.editing();

    match target {
      Some(customer_id) => {
        let patch = json!({
          "name": name,
          "mobile": mobile,
          "gstin": gstin,
          "address": address,
          "updatedAt": now,
        });
        self
          .store
          .update(Collection::Customers, &customer_id, patch)
          .await
          .map_err(RegistryError::persistence("update customer"))?;

        self.clear_if_target(&customer_id);
        tracing::info!(customer_id = %customer_id, "Customer updated");
        Ok(SaveCustomerResponse {
          customer_id,
          created: false,
        })
      }
      None => {
        let customer = Customer::new(name, mobile, gstin, address, now);
        let record = serde_json::to_value(&customer)?;
        let customer_id = self
          .store
          .create(Collection::Customers, record)
          .await
          .map_err(RegistryError::persistence("add customer"))?;

        tracing::info!(customer_id = %customer_id, "Customer added");
        Ok(SaveCustomerResponse {
          customer_id,
          created: true,
        })
      }
    }
  }

  /// Deleting the edit target also leaves edit mode
  pub async fn delete(&self, customer_id: &str) -> Result<(), RegistryError> {
    let customer_id = customer_id.trim();
    if customer_id.is_empty() {
      return Err(RegistryError::InvalidInput(
        "Customer id is required".to_string(),
      ));
    }

    self
      .store
      .delete(Collection::Customers, customer_id)
      .await
      .map_err(RegistryError::persistence("delete customer"))?;

    self.clear_if_target(customer_id);
    tracing::info!(customer_id = %customer_id, "Customer deleted");
    Ok(())
  }

  fn clear_if_target(&self, customer_id: &str) {
    let mut editing = self.lock();
    if editing.as_deref() == Some(customer_id) {
      *editing = None;
    }
  }

  fn lock(&self) -> MutexGuard<'_, Option<String>> {
    self.editing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}
