pub mod errors;
pub mod format;
pub mod layout;
pub mod message;
pub mod ports;
pub mod settings;

pub use errors::ExportError;
pub use layout::{Orientation, PageSize, PrintableLayout, RenderHints};
pub use message::{Recipient, ShareMessage};
pub use ports::{DocumentExporter, MessageLauncher};
pub use settings::ExportSettings;
