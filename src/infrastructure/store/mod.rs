pub mod journal;
pub mod memory;

pub use journal::JsonFileJournal;
pub use memory::InMemoryDocumentStore;
