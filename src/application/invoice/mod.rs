pub mod compose_session;
pub mod draft_request;
pub mod export_invoice;
pub mod search_history;
pub mod share_invoice;

pub use compose_session::{ComposingSession, FinalizeOutcome};
pub use draft_request::{DraftLineRequest, DraftRequest};
pub use export_invoice::{ExportInvoiceCommand, ExportInvoiceResponse, ExportInvoiceUseCase};
pub use search_history::{
  FilingFolderDto, InvoiceSummaryDto, SearchHistoryCommand, SearchHistoryResponse,
  SearchHistoryUseCase,
};
pub use share_invoice::{ShareInvoiceCommand, ShareInvoiceResponse, ShareInvoiceUseCase};
