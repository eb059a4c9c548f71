use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::files::{ensure_dir, output_path};
use super::renderer::HtmlRenderer;
use crate::domain::export::{DocumentExporter, ExportError, PrintableLayout, RenderHints};

/// Screen DPI that corresponds to a render scale of 1
const BASE_DPI: u32 = 96;

pub struct WkHtmlToPdfExporter {
  output_dir: PathBuf,
  wkhtmltopdf_path: String,
  renderer: HtmlRenderer,
}

impl WkHtmlToPdfExporter {
  pub fn new(output_dir: PathBuf, wkhtmltopdf_path: Option<String>, renderer: HtmlRenderer) -> Self {
    let wkhtmltopdf_path = wkhtmltopdf_path.unwrap_or_else(|| "wkhtmltopdf".to_string());

    Self {
      output_dir,
      wkhtmltopdf_path,
      renderer,
    }
  }

  async fn verify_wkhtmltopdf_installed(&self) -> Result<(), ExportError> {
    let output = Command::new(&self.wkhtmltopdf_path)
      .arg("--version")
      .output()
      .await
      .map_err(|e| {
        ExportError::Exporter(format!(
          "wkhtmltopdf not found: {}. Please install wkhtmltopdf.",
          e
        ))
      })?;

    if !output.status.success() {
      return Err(ExportError::Exporter(
        "wkhtmltopdf is not working correctly".to_string(),
      ));
    }

    Ok(())
  }
}

/// Command line for one conversion, page setup taken from the hints
pub(crate) fn wkhtmltopdf_args(hints: &RenderHints, input: &Path, output: &Path) -> Vec<OsString> {
  let margin = format!("{}mm", hints.margin_mm);
  let dpi = (BASE_DPI * hints.scale.max(1)).to_string();

  let mut args: Vec<OsString> = [
    "--page-size",
    hints.page_size.as_str(),
    "--orientation",
    hints.orientation.as_str(),
    "--margin-top",
    margin.as_str(),
    "--margin-bottom",
    margin.as_str(),
    "--margin-left",
    margin.as_str(),
    "--margin-right",
    margin.as_str(),
    "--dpi",
    dpi.as_str(),
    "--encoding",
    "utf-8",
    "--enable-local-file-access",
    "--quiet",
  ]
  .into_iter()
  .map(OsString::from)
  .collect();
  args.push(input.as_os_str().to_owned());
  args.push(output.as_os_str().to_owned());
  args
}

#[async_trait]
impl DocumentExporter for WkHtmlToPdfExporter {
  async fn export(&self, layout: &PrintableLayout, filename: &str) -> Result<PathBuf, ExportError> {
    self.verify_wkhtmltopdf_installed().await?;

    // 1. Render the page next to its destination
    let html = self.renderer.render(layout)?;
    ensure_dir(&self.output_dir).await?;
    let output_path = output_path(&self.output_dir, filename, "pdf");
    let html_path = output_path.with_extension("html");
    tokio::fs::write(&html_path, html).await?;

    tracing::info!(
      invoice_number = %layout.invoice_number,
      path = %output_path.display(),
      "Generating PDF"
    );

    // 2. Convert
    let result = Command::new(&self.wkhtmltopdf_path)
      .args(wkhtmltopdf_args(&layout.hints, &html_path, &output_path))
      .output()
      .await;

    if let Err(e) = tokio::fs::remove_file(&html_path).await {
      tracing::warn!(path = %html_path.display(), "Failed to remove intermediate HTML: {}", e);
    }

    let output = result
      .map_err(|e| ExportError::Exporter(format!("wkhtmltopdf execution failed: {}", e)))?;

    // 3. Check the conversion succeeded
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ExportError::Exporter(format!(
        "wkhtmltopdf failed: {}",
        stderr
      )));
    }

    if !output_path.exists() {
      return Err(ExportError::Exporter(
        "PDF file was not created".to_string(),
      ));
    }

    Ok(output_path)
  }
}
