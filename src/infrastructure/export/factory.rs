use std::path::PathBuf;
use std::sync::Arc;

use super::html_exporter::HtmlFileExporter;
use super::renderer::HtmlRenderer;
use super::wkhtmltopdf_exporter::WkHtmlToPdfExporter;
use crate::domain::export::{DocumentExporter, ExportError};
use crate::infrastructure::config::{ExportConfig, ExportEngine};

/// Exporter selected by `export.engine`
pub fn create_exporter(config: &ExportConfig) -> Result<Arc<dyn DocumentExporter>, ExportError> {
  let renderer = HtmlRenderer::new()?;
  let output_dir = PathBuf::from(&config.output_dir);

  let exporter: Arc<dyn DocumentExporter> = match config.engine {
    ExportEngine::Pdf => {
      tracing::info!(output_dir = %config.output_dir, "Using wkhtmltopdf exporter");
      Arc::new(WkHtmlToPdfExporter::new(
        output_dir,
        config.wkhtmltopdf_path.clone(),
        renderer,
      ))
    }
    ExportEngine::Html => {
      tracing::info!(output_dir = %config.output_dir, "Using HTML exporter");
      Arc::new(HtmlFileExporter::new(output_dir, renderer))
    }
  };

  Ok(exporter)
}
