//! Application layer
//!
//! Use cases that drive the domain: composing and finalizing invoices,
//! exporting and sharing them, maintaining the reference registries and
//! keeping local copies of the shared collections in sync.

pub mod invoice;
pub mod registry;
pub mod sync;
