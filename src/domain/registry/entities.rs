use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{Gstin, HsnCode, MobileNumber};

// Product - Item the agency sells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  /// Store-assigned id, injected on decode and never written back
  #[serde(default, skip_serializing)]
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub hsn_code: HsnCode,
}

impl Product {
  pub fn new(name: String, hsn_code: HsnCode) -> Self {
    Self {
      id: String::new(),
      name,
      hsn_code,
    }
  }
}

// Customer - Reusable buyer information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  #[serde(default, skip_serializing)]
  pub id: String,
  pub name: String,
  #[serde(
    default,
    deserialize_with = "crate::domain::registry::value_objects::deserialize_optional_mobile"
  )]
  pub mobile: Option<MobileNumber>,
  #[serde(default)]
  pub gstin: Gstin,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
  pub fn new(
    name: String,
    mobile: Option<MobileNumber>,
    gstin: Gstin,
    address: String,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: String::new(),
      name,
      mobile,
      gstin,
      address,
      created_at: Some(now),
      updated_at: Some(now),
    }
  }

  /// Mobile as printed on documents, empty when unknown
  pub fn mobile_display(&self) -> String {
    self
      .mobile
      .as_ref()
      .map(|m| m.as_str().to_string())
      .unwrap_or_default()
  }
}

// Agency Profile - The selling business, one per installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyProfile {
  pub name: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub gstin: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub tagline: String,
}

impl AgencyProfile {
  /// Name and GSTIN are stored upper-cased
  pub fn normalized(self) -> Self {
    Self {
      name: self.name.trim().to_uppercase(),
      address: self.address.trim().to_string(),
      gstin: self.gstin.trim().to_uppercase(),
      phone: self.phone.trim().to_string(),
      tagline: self.tagline.trim().to_string(),
    }
  }
}
