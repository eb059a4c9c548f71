use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{field} cannot be empty")]
  Empty { field: &'static str },

  #[error("{field} must be at most {max} characters")]
  TooLong { field: &'static str, max: usize },

  #[error("HSN code must be 2 to 8 digits")]
  InvalidHsnCode,

  #[error("GSTIN must be 15 letters or digits")]
  InvalidGstin,

  #[error("Mobile number must be between {min} and {max} characters")]
  MobileInvalidLength { min: usize, max: usize },

  #[error("Mobile number contains invalid characters")]
  MobileInvalidCharacters,
}

/// Harmonized System code printed against each invoice line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HsnCode(String);

impl HsnCode {
  /// Generic code used when a product has none recorded
  pub const GENERIC: &'static str = "2523";

  /// Blank input falls back to [`HsnCode::GENERIC`]
  pub fn new(code: Option<String>) -> Result<Self, ValidationError> {
    let code = code.map(|c| c.trim().to_string()).unwrap_or_default();
    if code.is_empty() {
      return Ok(Self::generic());
    }

    if !(2..=8).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_digit()) {
      return Err(ValidationError::InvalidHsnCode);
    }

    Ok(Self(code))
  }

  pub fn generic() -> Self {
    Self(Self::GENERIC.to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for HsnCode {
  fn default() -> Self {
    Self::generic()
  }
}

/// Stored values are taken as written; blank and `null` become the generic code
impl<'de> Deserialize<'de> for HsnCode {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Ok(match stored_text(deserializer)? {
      Some(code) => Self(code),
      None => Self::generic(),
    })
  }
}

impl fmt::Display for HsnCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// GST identification number, or the unregistered-person marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gstin(String);

impl Gstin {
  /// Marker stored for customers without a GST registration
  pub const UNREGISTERED: &'static str = "URP";
  const LENGTH: usize = 15;

  /// Blank input falls back to [`Gstin::UNREGISTERED`]
  pub fn new(gstin: Option<String>) -> Result<Self, ValidationError> {
    let gstin = gstin
      .map(|g| g.trim().to_uppercase())
      .unwrap_or_default();
    if gstin.is_empty() || gstin == Self::UNREGISTERED {
      return Ok(Self::unregistered());
    }

    if gstin.len() != Self::LENGTH || !gstin.chars().all(|c| c.is_ascii_alphanumeric()) {
      return Err(ValidationError::InvalidGstin);
    }

    Ok(Self(gstin))
  }

  pub fn unregistered() -> Self {
    Self(Self::UNREGISTERED.to_string())
  }

  pub fn is_registered(&self) -> bool {
    self.0 != Self::UNREGISTERED
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for Gstin {
  fn default() -> Self {
    Self::unregistered()
  }
}

/// Stored values are taken as written; blank and `null` become `URP`
impl<'de> Deserialize<'de> for Gstin {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Ok(match stored_text(deserializer)? {
      Some(gstin) => Self(gstin.to_uppercase()),
      None => Self::unregistered(),
    })
  }
}

impl fmt::Display for Gstin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Customer mobile number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileNumber(String);

impl MobileNumber {
  const MIN_LENGTH: usize = 10;
  const MAX_LENGTH: usize = 16;

  pub fn new(mobile: impl Into<String>) -> Result<Self, ValidationError> {
    let mobile = mobile.into().trim().to_string();

    if mobile.len() < Self::MIN_LENGTH || mobile.len() > Self::MAX_LENGTH {
      return Err(ValidationError::MobileInvalidLength {
        min: Self::MIN_LENGTH,
        max: Self::MAX_LENGTH,
      });
    }

    if !mobile
      .chars()
      .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-'))
    {
      return Err(ValidationError::MobileInvalidCharacters);
    }

    Ok(Self(mobile))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Digits only, suitable for dialing
  pub fn digits(&self) -> String {
    self.0.chars().filter(|c| c.is_ascii_digit()).collect()
  }

  pub fn has_country_code(&self) -> bool {
    self.0.starts_with('+')
  }
}

impl fmt::Display for MobileNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Trimmed stored text, `None` when null or blank
fn stored_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(
    value
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty()),
  )
}

/// Blank or `null` stored mobiles decode as no mobile
pub(crate) fn deserialize_optional_mobile<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<MobileNumber>, D::Error> {
  Ok(stored_text(deserializer)?.map(MobileNumber))
}

/// Trimmed, non-empty text of bounded length
pub(crate) fn required_text(
  value: impl Into<String>,
  field: &'static str,
  max: usize,
) -> Result<String, ValidationError> {
  let value = value.into().trim().to_string();
  if value.is_empty() {
    return Err(ValidationError::Empty { field });
  }
  if value.chars().count() > max {
    return Err(ValidationError::TooLong { field, max });
  }
  Ok(value)
}
