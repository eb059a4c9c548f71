use std::path::{Path, PathBuf};

use crate::domain::export::ExportError;

/// File name with path separators and reserved characters replaced
pub fn sanitize_filename(name: &str) -> String {
  let cleaned: String = name
    .trim()
    .chars()
    .map(|c| match c {
      '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
      c if c.is_control() => '_',
      c => c,
    })
    .collect();

  if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
    "invoice".to_string()
  } else {
    cleaned
  }
}

/// `dir/name` with the extension forced to `extension`
pub fn output_path(dir: &Path, filename: &str, extension: &str) -> PathBuf {
  let mut path = dir.join(sanitize_filename(filename));
  path.set_extension(extension);
  path
}

pub async fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
  tokio::fs::create_dir_all(dir).await?;
  Ok(())
}
