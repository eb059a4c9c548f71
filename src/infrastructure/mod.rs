pub mod config;
pub mod export;
pub mod messaging;
pub mod store;
