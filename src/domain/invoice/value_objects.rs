use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid rate: {0}")]
  InvalidRate(String),
}

// Invoice Number - User-editable text field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  /// Time-derived suggestion for a fresh draft: `{prefix}-{last 6 digits of
  /// the millisecond clock}`. Not guaranteed unique.
  pub fn seed(prefix: &str, unix_millis: i64) -> Self {
    Self(format!("{}-{:06}", prefix, unix_millis.rem_euclid(1_000_000)))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Rate - Price per unit before tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
  /// Highest accepted unit price. With any `u32` quantity the line amounts
  /// and taxes stay far inside `Decimal` range.
  pub const MAX: Decimal = dec!(1000000000000);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidRate(
        "Rate cannot be negative".to_string(),
      ));
    }
    if value > Self::MAX {
      return Err(ValueObjectError::InvalidRate(format!(
        "Rate cannot exceed {}",
        Self::MAX
      )));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Filing Path - year/month folder an invoice is filed under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingPath(String);

impl FilingPath {
  pub fn for_date(date: NaiveDate) -> Self {
    Self(format!("{}/{}", date.year(), date.format("%B")))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  /// `(year, month number)` when the path has the `{year}/{Month}` shape
  pub fn calendar_month(&self) -> Option<(i32, u32)> {
    let (year, month) = self.0.split_once('/')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<Month>().ok()?;
    Some((year, month.number_from_month()))
  }
}

/// Calendar order. Paths that are not `{year}/{Month}` sort after the rest,
/// by text.
impl Ord for FilingPath {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self.calendar_month(), other.calendar_month()) {
      (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => self.0.cmp(&other.0),
    }
  }
}

impl PartialOrd for FilingPath {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for FilingPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
