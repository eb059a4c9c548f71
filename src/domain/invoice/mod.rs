pub mod calculator;
pub mod draft;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod value_objects;

pub use calculator::{CGST_RATE, InvoiceTotals, SGST_RATE};
pub use draft::{DraftInvoice, DraftLineItem, DraftPhase, LineItemId, LineItemPatch};
pub use entities::{Invoice, InvoiceItem, InvoiceSnapshot, Transport};
pub use errors::InvoiceError;
pub use value_objects::{FilingPath, InvoiceNumber, Rate, ValueObjectError};
