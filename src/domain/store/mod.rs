pub mod errors;
pub mod ports;

pub use errors::StoreError;
pub use ports::{
  AGENCY_PROFILE_KEY, Collection, DocumentStore, Snapshot, SnapshotStream, StoredDocument,
};
