use async_trait::async_trait;
use std::path::PathBuf;

use super::files::{ensure_dir, output_path};
use super::renderer::HtmlRenderer;
use crate::domain::export::{DocumentExporter, ExportError, PrintableLayout};

/// Writes the rendered HTML page as is, for hosts without a PDF engine
pub struct HtmlFileExporter {
  output_dir: PathBuf,
  renderer: HtmlRenderer,
}

impl HtmlFileExporter {
  pub fn new(output_dir: PathBuf, renderer: HtmlRenderer) -> Self {
    Self {
      output_dir,
      renderer,
    }
  }
}

#[async_trait]
impl DocumentExporter for HtmlFileExporter {
  async fn export(&self, layout: &PrintableLayout, filename: &str) -> Result<PathBuf, ExportError> {
    let html = self.renderer.render(layout)?;
    ensure_dir(&self.output_dir).await?;

    let path = output_path(&self.output_dir, filename, "html");
    tokio::fs::write(&path, html).await?;

    tracing::info!(path = %path.display(), "Invoice exported as HTML");
    Ok(path)
  }
}
