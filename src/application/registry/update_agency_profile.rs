use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::domain::registry::{AgencyProfile, RegistryError};
use crate::domain::store::{AGENCY_PROFILE_KEY, Collection, DocumentStore};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAgencyProfileCommand {
  #[validate(length(
    min = 1,
    max = 200,
    message = "Agency name must be between 1 and 200 characters"
  ))]
  pub name: String,
  #[serde(default)]
  #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
  pub address: String,
  #[serde(default)]
  #[validate(length(max = 15, message = "GSTIN cannot exceed 15 characters"))]
  pub gstin: String,
  #[serde(default)]
  #[validate(length(max = 20, message = "Phone cannot exceed 20 characters"))]
  pub phone: String,
  #[serde(default)]
  #[validate(length(max = 200, message = "Tagline cannot exceed 200 characters"))]
  pub tagline: String,
}

/// Overwrites the singleton agency profile
pub struct UpdateAgencyProfileUseCase {
  store: Arc<dyn DocumentStore>,
}

impl UpdateAgencyProfileUseCase {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  pub async fn execute(
    &self,
    command: UpdateAgencyProfileCommand,
  ) -> Result<AgencyProfile, RegistryError> {
    command.validate()?;

    let profile = AgencyProfile {
      name: command.name,
      address: command.address,
      gstin: command.gstin,
      phone: command.phone,
      tagline: command.tagline,
    }
    .normalized();
    if profile.name.is_empty() {
      return Err(RegistryError::InvalidInput(
        "Agency name is required".to_string(),
      ));
    }

    let record = serde_json::to_value(&profile)?;
    self
      .store
      .replace(Collection::Agency, AGENCY_PROFILE_KEY, record)
      .await
      .map_err(RegistryError::persistence("update agency profile"))?;

    tracing::info!(name = %profile.name, "Agency profile updated");
    Ok(profile)
  }
}
