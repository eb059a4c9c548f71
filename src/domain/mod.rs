pub mod export;
pub mod invoice;
pub mod registry;
pub mod store;
