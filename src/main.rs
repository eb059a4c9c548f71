use anyhow::{Context, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billbook::{
  application::invoice::{
    ComposingSession, DraftRequest, ExportInvoiceCommand, ExportInvoiceUseCase, FinalizeOutcome,
    SearchHistoryCommand, SearchHistoryUseCase, ShareInvoiceCommand, ShareInvoiceUseCase,
  },
  application::registry::{
    AddProductCommand, AddProductUseCase, CustomerEditor, DeleteProductCommand,
    DeleteProductUseCase, SaveCustomerCommand, UpdateAgencyProfileCommand,
    UpdateAgencyProfileUseCase,
  },
  application::sync::{SyncCoordinator, SyncHandle},
  domain::export::format::format_currency,
  domain::store::DocumentStore,
  infrastructure::{
    config::Config,
    export::create_exporter,
    messaging::WhatsAppLauncher,
    store::{InMemoryDocumentStore, JsonFileJournal},
  },
};

const INITIAL_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE: &str = "Usage: billbook <command>

  serve                                      follow the store until Ctrl+C (default)
  history [query]                            list invoices, newest first
  folders                                    list invoices by year/month
  export <id|number>                         write the invoice document
  share <id|number> [--choose-contact]       export, then open the share message
  invoice <draft.json> [--export]            finalize a draft read from a JSON file
  product list | add <name> [hsn] | delete <id>
  customer list | add <name> [mobile] [gstin] [address]
           | edit <id> <name> [mobile] [gstin] [address] | delete <id>
  agency show | set <profile.json>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billbook=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting billbook");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  let store: Arc<dyn DocumentStore> = match &config.store.data_dir {
    Some(dir) => {
      tracing::info!("Using journal store at {}", dir.display());
      Arc::new(
        InMemoryDocumentStore::with_journal(JsonFileJournal::new(dir))
          .await
          .context("Failed to open document journal")?,
      )
    }
    None => {
      tracing::warn!("No data directory configured, documents stay in memory");
      Arc::new(InMemoryDocumentStore::new())
    }
  };

  let sync = SyncCoordinator::start(store.clone(), config.agency.profile())
    .await
    .context("Failed to subscribe to the document store")?;

  let args: Vec<String> = std::env::args().skip(1).collect();
  let app = App {
    config,
    store,
    sync,
  };
  let result = app.run(&args).await;

  app.sync.shutdown().await;
  if result.is_err() {
    eprintln!("{}", USAGE);
  }
  result
}

struct App {
  config: Config,
  store: Arc<dyn DocumentStore>,
  sync: SyncHandle,
}

impl App {
  async fn run(&self, args: &[String]) -> anyhow::Result<()> {
    let arg = |i: usize| args.get(i).map(String::as_str);
    let flag = |name: &str| args.iter().any(|a| a == name);

    match (arg(0).unwrap_or("serve"), arg(1)) {
      ("serve", _) => self.serve().await,
      ("history", query) => self.history(query.unwrap_or_default()).await,
      ("folders", _) => self.folders().await,
      ("export", Some(key)) => self.export(key).await,
      ("share", Some(key)) => self.share(key, flag("--choose-contact")).await,
      ("invoice", Some(file)) => self.invoice(Path::new(file), flag("--export")).await,
      ("product", Some(action)) => self.product(action, &args[2..]).await,
      ("customer", Some(action)) => self.customer(action, &args[2..]).await,
      ("agency", Some(action)) => self.agency(action, arg(2)).await,
      (command, _) => bail!("Unknown or incomplete command: {}", command),
    }
  }

  /// Keep following the store until interrupted
  async fn serve(&self) -> anyhow::Result<()> {
    let mut reference = self.sync.watch_reference();
    let mut invoices = self.sync.watch_invoices();
    tracing::info!("Following the document store, press Ctrl+C to stop");

    loop {
      tokio::select! {
        _ = tokio::signal::ctrl_c() => {
          tracing::info!("Shutting down");
          return Ok(());
        }
        changed = reference.changed() => {
          if changed.is_err() {
            return Ok(());
          }
          let refs = reference.borrow_and_update().clone();
          tracing::info!(
            products = refs.products.len(),
            customers = refs.customers.len(),
            agency = %refs.agency.name,
            "Reference data updated"
          );
        }
        changed = invoices.changed() => {
          if changed.is_err() {
            return Ok(());
          }
          let count = invoices.borrow_and_update().len();
          tracing::info!(invoices = count, "Invoice ledger updated");
        }
      }
    }
  }

  async fn history(&self, query: &str) -> anyhow::Result<()> {
    let history = self.history_use_case().await?;
    let response = history.execute(SearchHistoryCommand {
      query: query.to_string(),
    });

    if response.invoices.is_empty() {
      println!("No invoices found");
    }
    for invoice in response.invoices {
      println!(
        "{}  {}  {}  {}  {}",
        invoice.id,
        invoice.invoice_number,
        invoice.date.format("%d/%m/%Y"),
        invoice.customer_name,
        format_currency(invoice.total)
      );
    }
    Ok(())
  }

  async fn folders(&self) -> anyhow::Result<()> {
    for folder in self.history_use_case().await?.folders() {
      println!(
        "{}  ({} invoices, {})",
        folder.filing_path,
        folder.invoice_count,
        format_currency(folder.total)
      );
      for invoice in folder.invoices {
        println!("  {}  {}", invoice.invoice_number, invoice.customer_name);
      }
    }
    Ok(())
  }

  async fn export(&self, key: &str) -> anyhow::Result<()> {
    let invoice = self.history_use_case().await?.find(key)?;
    let exporter = create_exporter(&self.config.export)?;
    let use_case = ExportInvoiceUseCase::new(exporter, self.config.export_settings());

    let response = use_case
      .execute(ExportInvoiceCommand {
        invoice: invoice.snapshot,
      })
      .await?;
    println!("{}", response.path.display());
    Ok(())
  }

  async fn share(&self, key: &str, choose_contact: bool) -> anyhow::Result<()> {
    let invoice = self.history_use_case().await?.find(key)?;
    let exporter = create_exporter(&self.config.export)?;
    let launcher = Arc::new(WhatsAppLauncher::new(self.config.messaging.opener.clone()));
    let use_case = ShareInvoiceUseCase::new(exporter, launcher, self.config.export_settings());

    let response = use_case
      .execute(ShareInvoiceCommand {
        invoice: invoice.snapshot,
        choose_contact,
      })
      .await?;
    if let Some(path) = response.document {
      println!("{}", path.display());
    }
    Ok(())
  }

  /// Compose a draft from a JSON file and finalize it
  async fn invoice(&self, file: &Path, export: bool) -> anyhow::Result<()> {
    let request: DraftRequest = read_json(file).await?;
    self.wait_for_sync().await?;

    let session = ComposingSession::new(
      self.store.clone(),
      self.sync.watch_reference(),
      self.config.invoice.number_prefix.clone(),
    );
    request.apply_to(&session)?;

    let invoice = match session.finalize().await? {
      FinalizeOutcome::Finalized(invoice) => invoice,
      FinalizeOutcome::AlreadyInFlight => bail!("A finalize is already running"),
    };
    println!(
      "{}  {}  {}",
      invoice.id,
      invoice.snapshot.invoice_number,
      format_currency(invoice.snapshot.totals.total)
    );

    if export {
      let exporter = create_exporter(&self.config.export)?;
      let response = ExportInvoiceUseCase::new(exporter, self.config.export_settings())
        .execute(ExportInvoiceCommand {
          invoice: invoice.snapshot,
        })
        .await?;
      println!("{}", response.path.display());
    }
    Ok(())
  }

  async fn product(&self, action: &str, args: &[String]) -> anyhow::Result<()> {
    match (action, args) {
      ("list", _) => {
        self.wait_for_sync().await?;
        for product in &self.sync.reference_data().products {
          println!("{}  {}  {}", product.id, product.name, product.hsn_code);
        }
      }
      ("add", [name, rest @ ..]) => {
        let response = AddProductUseCase::new(self.store.clone())
          .execute(AddProductCommand {
            name: name.clone(),
            hsn_code: rest.first().cloned(),
          })
          .await?;
        println!("{}", response.product_id);
      }
      ("delete", [id, ..]) => {
        DeleteProductUseCase::new(self.store.clone())
          .execute(DeleteProductCommand {
            product_id: id.clone(),
          })
          .await?;
      }
      _ => bail!("Unknown or incomplete product command: {}", action),
    }
    Ok(())
  }

  async fn customer(&self, action: &str, args: &[String]) -> anyhow::Result<()> {
    let editor = CustomerEditor::new(self.store.clone(), self.sync.watch_reference());

    match (action, args) {
      ("list", _) => {
        self.wait_for_sync().await?;
        for customer in &self.sync.reference_data().customers {
          println!(
            "{}  {}  {}  {}",
            customer.id,
            customer.name,
            customer.mobile_display(),
            customer.gstin
          );
        }
      }
      ("add", [fields @ ..]) if !fields.is_empty() => {
        let response = editor.save(customer_form(fields)).await?;
        println!("{}", response.customer_id);
      }
      ("edit", [id, fields @ ..]) if !fields.is_empty() => {
        self.wait_for_sync().await?;
        editor.begin_edit(id)?;
        let response = editor.save(customer_form(fields)).await?;
        println!("{}", response.customer_id);
      }
      ("delete", [id, ..]) => editor.delete(id).await?,
      _ => bail!("Unknown or incomplete customer command: {}", action),
    }
    Ok(())
  }

  async fn agency(&self, action: &str, file: Option<&str>) -> anyhow::Result<()> {
    match (action, file) {
      ("show", _) => {
        self.wait_for_sync().await?;
        println!(
          "{}",
          serde_json::to_string_pretty(&self.sync.reference_data().agency)?
        );
      }
      ("set", Some(file)) => {
        let command: UpdateAgencyProfileCommand = read_json(Path::new(file)).await?;
        let profile = UpdateAgencyProfileUseCase::new(self.store.clone())
          .execute(command)
          .await?;
        println!("{}", serde_json::to_string_pretty(&profile)?);
      }
      _ => bail!("Unknown or incomplete agency command: {}", action),
    }
    Ok(())
  }

  async fn history_use_case(&self) -> anyhow::Result<SearchHistoryUseCase> {
    self.wait_for_sync().await?;
    Ok(SearchHistoryUseCase::new(self.sync.watch_invoices()))
  }

  /// Every collection has been loaded at least once
  async fn wait_for_sync(&self) -> anyhow::Result<()> {
    let synced = tokio::time::timeout(INITIAL_SYNC_TIMEOUT, self.sync.synced())
      .await
      .context("Timed out waiting for the document store")?;
    if !synced {
      bail!("Document sync stopped before the first snapshot");
    }
    Ok(())
  }
}

/// `name [mobile] [gstin] [address]`
fn customer_form(fields: &[String]) -> SaveCustomerCommand {
  let field = |i: usize| fields.get(i).cloned();
  SaveCustomerCommand {
    name: field(0).unwrap_or_default(),
    mobile: field(1),
    gstin: field(2),
    address: field(3).unwrap_or_default(),
  }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
