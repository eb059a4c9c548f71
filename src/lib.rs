//! Invoice composition and ledger engine for a GST trading agency.

pub mod application;
pub mod domain;
pub mod infrastructure;
