use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::export::{ExportError, MessageLauncher, Recipient};

/// WhatsApp compose link for a pre-encoded message body
pub fn compose_url(recipient: &Recipient, encoded_body: &str) -> String {
  match recipient {
    Recipient::Phone(phone) => format!("https://wa.me/{}?text={}", phone, encoded_body),
    Recipient::ChooseContact => format!("https://api.whatsapp.com/send?text={}", encoded_body),
  }
}

/// Opens the compose link with a desktop opener such as `xdg-open`
pub struct WhatsAppLauncher {
  opener: String,
}

impl WhatsAppLauncher {
  pub fn new(opener: impl Into<String>) -> Self {
    Self {
      opener: opener.into(),
    }
  }
}

#[async_trait]
impl MessageLauncher for WhatsAppLauncher {
  async fn launch(&self, recipient: &Recipient, encoded_body: &str) -> Result<(), ExportError> {
    let url = compose_url(recipient, encoded_body);
    tracing::info!(opener = %self.opener, recipient = ?recipient, "Opening WhatsApp compose link");

    let status = Command::new(&self.opener)
      .arg(&url)
      .status()
      .await
      .map_err(|e| ExportError::Launch(format!("{} could not be started: {}", self.opener, e)))?;

    if !status.success() {
      return Err(ExportError::Launch(format!(
        "{} exited with {}",
        self.opener, status
      )));
    }
    Ok(())
  }
}

/// Writes the compose link to the log instead of opening it
#[derive(Debug, Default)]
pub struct LoggingLauncher;

#[async_trait]
impl MessageLauncher for LoggingLauncher {
  async fn launch(&self, recipient: &Recipient, encoded_body: &str) -> Result<(), ExportError> {
    tracing::info!(url = %compose_url(recipient, encoded_body), "Share link");
    Ok(())
  }
}
