use async_trait::async_trait;
use std::path::PathBuf;

use super::errors::ExportError;
use super::layout::PrintableLayout;
use super::message::Recipient;

/// Turns a layout into a document on disk
#[async_trait]
pub trait DocumentExporter: Send + Sync {
  /// Write the document and return where it landed
  async fn export(&self, layout: &PrintableLayout, filename: &str)
  -> Result<PathBuf, ExportError>;
}

/// Hands a composed message to a messaging app. Delivery is not confirmed.
#[async_trait]
pub trait MessageLauncher: Send + Sync {
  async fn launch(&self, recipient: &Recipient, encoded_body: &str) -> Result<(), ExportError>;
}
