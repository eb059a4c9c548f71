//! End to end: registries, composing, finalizing, history, export and share.

use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

use billbook::application::invoice::{
  ComposingSession, ExportInvoiceCommand, ExportInvoiceUseCase, FinalizeOutcome,
  SearchHistoryCommand, SearchHistoryUseCase, ShareInvoiceCommand, ShareInvoiceUseCase,
};
use billbook::application::registry::{
  AddProductCommand, AddProductUseCase, CustomerEditor, DeleteProductCommand,
  DeleteProductUseCase, SaveCustomerCommand, UpdateAgencyProfileCommand,
  UpdateAgencyProfileUseCase,
};
use billbook::application::sync::SyncCoordinator;
use billbook::domain::export::{ExportSettings, Recipient};
use billbook::domain::invoice::{DraftPhase, LineItemPatch, Rate, Transport};
use billbook::infrastructure::config::Config;
use billbook::infrastructure::export::{HtmlFileExporter, HtmlRenderer};
use billbook::infrastructure::messaging::LoggingLauncher;
use billbook::infrastructure::store::{InMemoryDocumentStore, JsonFileJournal};

#[tokio::test]
async fn test_invoice_workflow() {
  let data_dir = tempfile::tempdir().unwrap();
  let export_dir = tempfile::tempdir().unwrap();
  let store = Arc::new(
    InMemoryDocumentStore::with_journal(JsonFileJournal::new(data_dir.path()))
      .await
      .unwrap(),
  );
  let config = Config::default();
  let sync = SyncCoordinator::start(store.clone(), config.agency.profile())
    .await
    .unwrap();

  // Registries
  UpdateAgencyProfileUseCase::new(store.clone())
    .execute(UpdateAgencyProfileCommand {
      name: "Arya Cement Agency".to_string(),
      address: "Main Road, Delhi".to_string(),
      gstin: "07AABCA1234Z1Z1".to_string(),
      phone: "7451917919".to_string(),
      tagline: "Authorized Dealer".to_string(),
    })
    .await
    .unwrap();
  let products = AddProductUseCase::new(store.clone());
  let ppc = products
    .execute(AddProductCommand {
      name: "PPC".to_string(),
      hsn_code: None,
    })
    .await
    .unwrap();
  let tmt = products
    .execute(AddProductCommand {
      name: "TMT Bar".to_string(),
      hsn_code: Some("7214".to_string()),
    })
    .await
    .unwrap();
  let editor = CustomerEditor::new(store.clone(), sync.watch_reference());
  let customer = editor
    .save(SaveCustomerCommand {
      name: "Sharma Builders".to_string(),
      mobile: Some("9811111111".to_string()),
      gstin: None,
      address: "Karol Bagh".to_string(),
    })
    .await
    .unwrap();

  let mut reference = sync.watch_reference();
  tokio::time::timeout(
    Duration::from_secs(1),
    reference.wait_for(|r| {
      r.products.len() == 2 && r.customers.len() == 1 && r.agency.name == "ARYA CEMENT AGENCY"
    }),
  )
  .await
  .unwrap()
  .unwrap();

  // Compose and finalize
  let session = ComposingSession::new(store.clone(), sync.watch_reference(), "ARYA");
  let first = session.draft().line_items()[0].local_id;
  session
    .edit_line_item(
      first,
      LineItemPatch::product(ppc.product_id.clone())
        .quantity(10)
        .rate(Rate::new(dec!(350)).unwrap()),
    )
    .unwrap();
  let second = session.add_line_item().unwrap();
  session
    .edit_line_item(
      second,
      LineItemPatch::product(tmt.product_id.clone())
        .quantity(5)
        .rate(Rate::new(dec!(400)).unwrap()),
    )
    .unwrap();
  session
    .set_customer(Some(customer.customer_id.clone()))
    .unwrap();
  session
    .set_transport(Transport::new("DL 1C 1234", ""))
    .unwrap();
  session.set_invoice_number("ARYA-000123").unwrap();
  assert_eq!(session.totals().total, dec!(6490));

  let invoice = match session.finalize().await.unwrap() {
    FinalizeOutcome::Finalized(invoice) => invoice,
    FinalizeOutcome::AlreadyInFlight => panic!("no other finalize was running"),
  };
  assert_eq!(invoice.snapshot.invoice_number, "ARYA-000123");
  assert_eq!(invoice.snapshot.agency_snapshot.name, "ARYA CEMENT AGENCY");
  assert_eq!(invoice.snapshot.items[1].hsn_code, "7214");
  assert_eq!(invoice.snapshot.totals.cgst, dec!(495));

  let draft = session.draft();
  assert_eq!(draft.phase(), DraftPhase::Empty);
  assert_eq!(draft.customer_id(), None);
  assert_eq!(draft.line_items().len(), 1);

  // History
  let mut invoices = sync.watch_invoices();
  tokio::time::timeout(Duration::from_secs(1), invoices.wait_for(|i| i.len() == 1))
    .await
    .unwrap()
    .unwrap();
  let history = SearchHistoryUseCase::new(sync.watch_invoices());
  let found = history.execute(SearchHistoryCommand {
    query: "sharma".to_string(),
  });
  assert_eq!(found.invoices.len(), 1);
  assert_eq!(found.invoices[0].id, invoice.id);
  assert!(
    history
      .execute(SearchHistoryCommand {
        query: "gupta".to_string(),
      })
      .invoices
      .is_empty()
  );
  let stored = history.find("ARYA-000123").unwrap();
  assert_eq!(stored.snapshot, invoice.snapshot);

  // Later registry edits leave the finalized snapshot alone
  editor.begin_edit(&customer.customer_id).unwrap();
  editor
    .save(SaveCustomerCommand {
      name: "Sharma Constructions".to_string(),
      mobile: Some("9822222222".to_string()),
      gstin: None,
      address: "Rajouri Garden".to_string(),
    })
    .await
    .unwrap();
  DeleteProductUseCase::new(store.clone())
    .execute(DeleteProductCommand {
      product_id: ppc.product_id.clone(),
    })
    .await
    .unwrap();
  tokio::time::timeout(
    Duration::from_secs(1),
    reference.wait_for(|r| {
      r.products.len() == 1 && r.customers[0].name == "Sharma Constructions"
    }),
  )
  .await
  .unwrap()
  .unwrap();

  let after_edits = history.find(&invoice.id).unwrap();
  assert_eq!(after_edits.snapshot, invoice.snapshot);
  assert_eq!(after_edits.snapshot.customer_name, "Sharma Builders");
  assert_eq!(after_edits.snapshot.customer_mobile, "9811111111");
  assert_eq!(after_edits.snapshot.customer_address, "Karol Bagh");
  assert_eq!(after_edits.snapshot.items[0].product_name, "PPC");
  assert_eq!(after_edits.snapshot.items[0].hsn_code, "2523");

  // Export and share
  let exporter = Arc::new(HtmlFileExporter::new(
    export_dir.path().to_path_buf(),
    HtmlRenderer::new().unwrap(),
  ));
  let exported = ExportInvoiceUseCase::new(exporter.clone(), ExportSettings::default())
    .execute(ExportInvoiceCommand {
      invoice: stored.snapshot.clone(),
    })
    .await
    .unwrap();
  let html = std::fs::read_to_string(&exported.path).unwrap();
  assert!(html.contains("ARYA-000123"));
  assert!(html.contains("Sharma Builders"));
  assert!(html.contains("DL 1C 1234"));

  let shared = ShareInvoiceUseCase::new(
    exporter,
    Arc::new(LoggingLauncher),
    config.export_settings(),
  )
  .execute(ShareInvoiceCommand {
    invoice: stored.snapshot,
    choose_contact: false,
  })
  .await
  .unwrap();
  assert_eq!(shared.recipient, Recipient::Phone("919811111111".to_string()));
  assert!(shared.document.is_some());

  sync.shutdown().await;

  // The journal brings every collection back after a restart
  let reopened = Arc::new(
    InMemoryDocumentStore::with_journal(JsonFileJournal::new(data_dir.path()))
      .await
      .unwrap(),
  );
  let sync = SyncCoordinator::start(reopened, config.agency.profile())
    .await
    .unwrap();
  let mut invoices = sync.watch_invoices();
  tokio::time::timeout(Duration::from_secs(1), invoices.wait_for(|i| i.len() == 1))
    .await
    .unwrap()
    .unwrap();
  let mut reference = sync.watch_reference();
  tokio::time::timeout(
    Duration::from_secs(1),
    reference.wait_for(|r| {
      r.products.len() == 1 && r.customers.len() == 1 && r.customers[0].name == "Sharma Constructions"
    }),
  )
  .await
  .unwrap()
  .unwrap();
  sync.shutdown().await;
}
