use std::path::{Path, PathBuf};

use crate::domain::store::{Collection, Snapshot, StoreError};

/// One JSON file per collection under a data directory.
///
/// Each write replaces the whole file via a temporary sibling and a rename,
/// so a crash leaves either the old or the new contents.
#[derive(Debug, Clone)]
pub struct JsonFileJournal {
  dir: PathBuf,
}

impl JsonFileJournal {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path(&self, collection: Collection) -> PathBuf {
    self.dir.join(format!("{}.json", collection.as_str()))
  }

  /// Stored contents, empty when the collection was never written
  pub async fn load(&self, collection: Collection) -> Result<Snapshot, StoreError> {
    let path = self.path(collection);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::new()),
      Err(e) => Err(e.into()),
    }
  }

  pub async fn persist(&self, collection: Collection, snapshot: &Snapshot) -> Result<(), StoreError> {
    tokio::fs::create_dir_all(&self.dir).await?;

    let path = self.path(collection);
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, &path).await?;

    tracing::debug!(
      collection = %collection,
      documents = snapshot.len(),
      path = %path.display(),
      "Collection written to journal"
    );
    Ok(())
  }
}
