use serde::{Deserialize, Serialize};

/// Fixed text printed on every exported invoice and share message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
  pub terms: Vec<String>,
  pub signatory: String,
  /// Number customers message for a PDF copy; the note is omitted when blank
  pub contact_number: String,
  pub share_note: String,
  /// Dialling prefix for mobiles stored without one, e.g. `+91`
  pub country_code: String,
}

impl Default for ExportSettings {
  fn default() -> Self {
    Self {
      terms: vec![
        "1. Computer generated bill. No signature required.".to_string(),
        "2. Subject to Delhi Jurisdiction.".to_string(),
        "3. Goods once sold cannot be returned.".to_string(),
      ],
      signatory: "Arya Cement Agency".to_string(),
      contact_number: String::new(),
      share_note: "Agar aapko bill PDF chahiye toh iss number par bill number WhatsApp karein:"
        .to_string(),
      country_code: "+91".to_string(),
    }
  }
}
