pub mod coordinator;

pub use coordinator::{SyncCoordinator, SyncHandle};
