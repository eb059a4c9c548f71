pub mod whatsapp;

pub use whatsapp::{LoggingLauncher, WhatsAppLauncher, compose_url};
