use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::domain::export::ExportSettings;
use crate::domain::registry::AgencyProfile;

fn default_number_prefix() -> String {
  "ARYA".to_string()
}

fn default_output_dir() -> String {
  "./data/invoices".to_string()
}

fn default_opener() -> String {
  "xdg-open".to_string()
}

fn default_country_code() -> String {
  "+91".to_string()
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub agency: AgencyConfig,
  #[serde(default)]
  pub invoice: InvoiceConfig,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub export: ExportConfig,
  #[serde(default)]
  pub messaging: MessagingConfig,
}

/// Agency profile used until one is saved to the store
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyConfig {
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

impl Default for AgencyConfig {
  fn default() -> Self {
    Self {
      name: "ARYA CEMENT AGENCY".to_string(),
      address: "Main Road, Cement Market, Delhi - 110001".to_string(),
      gstin: "07AABCA1234Z1Z1".to_string(),
      phone: "9876543210".to_string(),
      tagline: "Authorized Dealer - Premium Quality Cement".to_string(),
    }
  }
}

impl AgencyConfig {
  pub fn profile(&self) -> AgencyProfile {
    AgencyProfile {
      name: self.name.clone(),
      address: self.address.clone(),
      gstin: self.gstin.clone(),
      phone: self.phone.clone(),
      tagline: self.tagline.clone(),
    }
    .normalized()
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceConfig {
  #[serde(default = "default_number_prefix")]
  pub number_prefix: String,
}

impl Default for InvoiceConfig {
  fn default() -> Self {
    Self {
      number_prefix: default_number_prefix(),
    }
  }
}

/// Store configuration. Without a data directory everything stays in memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
  #[serde(default)]
  pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportEngine {
  #[default]
  Pdf,
  Html,
}

/// Document export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
  #[serde(default)]
  pub engine: ExportEngine,
  #[serde(default = "default_output_dir")]
  pub output_dir: String,
  #[serde(default)]
  pub wkhtmltopdf_path: Option<String>,
  #[serde(default)]
  pub terms: Option<Vec<String>>,
  #[serde(default)]
  pub signatory: Option<String>,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      engine: ExportEngine::default(),
      output_dir: default_output_dir(),
      wkhtmltopdf_path: None,
      terms: None,
      signatory: None,
    }
  }
}

/// Share message configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
  /// Command that opens the compose URL, e.g. `xdg-open` or `open`
  #[serde(default = "default_opener")]
  pub opener: String,
  /// Number printed in the share note; falls back to the agency phone
  #[serde(default)]
  pub contact_number: Option<String>,
  #[serde(default)]
  pub share_note: Option<String>,
  #[serde(default = "default_country_code")]
  pub country_code: String,
}

impl Default for MessagingConfig {
  fn default() -> Self {
    Self {
      opener: default_opener(),
      contact_number: None,
      share_note: None,
      country_code: default_country_code(),
    }
  }
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml (if exists)
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with BILLBOOK_ prefix
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the BILLBOOK_ prefix and are separated by double underscores:
  /// - `BILLBOOK_AGENCY__NAME="ARYA CEMENT AGENCY"`
  /// - `BILLBOOK_INVOICE__NUMBER_PREFIX=ARYA`
  /// - `BILLBOOK_STORE__DATA_DIR=./data/store`
  /// - `BILLBOOK_EXPORT__ENGINE=html`
  /// - `BILLBOOK_MESSAGING__CONTACT_NUMBER=7451917919`
  ///
  /// # Errors
  ///
  /// Returns a `ConfigError` if a configuration file contains invalid TOML
  /// or a value has the wrong type.
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(false))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Use double underscore as separator: BILLBOOK_EXPORT__ENGINE=html
      .add_source(
        Environment::with_prefix("BILLBOOK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }

  /// Fixed invoice text, with unset fields taken from the built-in defaults
  pub fn export_settings(&self) -> ExportSettings {
    let defaults = ExportSettings::default();
    ExportSettings {
      terms: self.export.terms.clone().unwrap_or(defaults.terms),
      signatory: self.export.signatory.clone().unwrap_or(defaults.signatory),
      contact_number: self
        .messaging
        .contact_number
        .clone()
        .unwrap_or_else(|| self.agency.phone.clone()),
      share_note: self
        .messaging
        .share_note
        .clone()
        .unwrap_or(defaults.share_note),
      country_code: self.messaging.country_code.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_structure() {
    let toml = r#"
            [agency]
            name = "arya cement agency"
            gstin = "07aabca1234z1z1"

            [invoice]
            number_prefix = "INV"

            [store]
            data_dir = "./data/store"

            [export]
            engine = "html"
            output_dir = "./out"
            signatory = "Arya Cement"

            [messaging]
            opener = "open"
            contact_number = "7451917919"
        "#;

    let config: Config = toml::from_str(toml).expect("Failed to parse config");

    assert_eq!(config.agency.profile().name, "ARYA CEMENT AGENCY");
    assert_eq!(config.agency.profile().gstin, "07AABCA1234Z1Z1");
    assert_eq!(config.invoice.number_prefix, "INV");
    assert_eq!(config.store.data_dir, Some(PathBuf::from("./data/store")));
    assert_eq!(config.export.engine, ExportEngine::Html);
    assert_eq!(config.export.output_dir, "./out");
    assert!(config.export.wkhtmltopdf_path.is_none());
    assert_eq!(config.messaging.opener, "open");
    assert_eq!(config.messaging.country_code, "+91"); // default

    let settings = config.export_settings();
    assert_eq!(settings.signatory, "Arya Cement");
    assert_eq!(settings.terms.len(), 3); // default
    assert_eq!(settings.contact_number, "7451917919");
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config: Config = toml::from_str("").expect("Failed to parse config");

    assert_eq!(config.agency.name, "ARYA CEMENT AGENCY");
    assert_eq!(config.invoice.number_prefix, "ARYA");
    assert!(config.store.data_dir.is_none());
    assert_eq!(config.export.engine, ExportEngine::Pdf);
    assert_eq!(config.messaging.opener, "xdg-open");
    assert_eq!(config.export_settings().contact_number, "9876543210");
  }
}
