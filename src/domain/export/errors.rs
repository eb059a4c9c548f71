use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("Failed to render layout: {0}")]
  Render(String),

  #[error("Document export failed: {0}")]
  Exporter(String),

  #[error("Failed to launch message: {0}")]
  Launch(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}
