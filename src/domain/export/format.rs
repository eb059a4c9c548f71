//! Display formatting shared by the printable layout and share message.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Amount with Indian digit grouping (`12,34,567.5`), at most two decimals
pub fn format_amount(value: Decimal) -> String {
  let rounded = value.round_dp(2).normalize();
  let text = rounded.abs().to_string();
  let (integer, fraction) = match text.split_once('.') {
    Some((integer, fraction)) => (integer, Some(fraction)),
    None => (text.as_str(), None),
  };

  let mut out = String::new();
  if rounded.is_sign_negative() && !rounded.is_zero() {
    out.push('-');
  }
  out.push_str(&group_indian(integer));
  if let Some(fraction) = fraction {
    out.push('.');
    out.push_str(fraction);
  }
  out
}

/// `format_amount` with the rupee sign
pub fn format_currency(value: Decimal) -> String {
  format!("₹{}", format_amount(value))
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
  date.format("%d/%m/%Y").to_string()
}

/// Mobile as printed: country code prefixed unless the number carries one.
/// Blank stays blank.
pub fn display_mobile(mobile: &str, country_code: &str) -> String {
  let mobile = mobile.trim();
  if mobile.is_empty() {
    return String::new();
  }
  if mobile.starts_with('+') || country_code.trim().is_empty() {
    return mobile.to_string();
  }
  format!("{} {}", country_code.trim(), mobile)
}

/// Percentage label for a rate such as `0.09` → `9`
pub fn format_percent(rate: Decimal) -> String {
  (rate * Decimal::ONE_HUNDRED).normalize().to_string()
}

fn group_indian(digits: &str) -> String {
  if digits.len() <= 3 {
    return digits.to_string();
  }
  let (head, tail) = digits.split_at(digits.len() - 3);
  let mut groups = Vec::new();
  let mut end = head.len();
  while end > 2 {
    groups.push(&head[end - 2..end]);
    end -= 2;
  }
  groups.push(&head[..end]);
  groups.reverse();
  format!("{},{}", groups.join(","), tail)
}
