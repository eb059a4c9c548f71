//! Statutory tax and total computation.
//!
//! Amounts are exact decimals. Nothing is rounded here; rounding is a
//! display concern handled by the export formatter.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Central GST, 9%
pub const CGST_RATE: Decimal = dec!(0.09);
/// State GST, 9%
pub const SGST_RATE: Decimal = dec!(0.09);

/// Saturates instead of overflowing. Validated rates never get near the
/// limit; stored invoices from other writers might.
pub fn line_amount(quantity: u32, rate: Decimal) -> Decimal {
  Decimal::from(quantity).saturating_mul(rate)
}

// Invoice Totals - Derived from line items, stored only on finalized invoices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub subtotal: Decimal,
  pub cgst: Decimal,
  pub sgst: Decimal,
  pub total: Decimal,
}

impl InvoiceTotals {
  pub fn calculate<I>(lines: I) -> Self
  where
    I: IntoIterator<Item = (u32, Decimal)>,
  {
    let subtotal = lines
      .into_iter()
      .fold(Decimal::ZERO, |acc, (quantity, rate)| {
        acc.saturating_add(line_amount(quantity, rate))
      });
    let cgst = subtotal.saturating_mul(CGST_RATE);
    let sgst = subtotal.saturating_mul(SGST_RATE);

    Self {
      subtotal,
      cgst,
      sgst,
      total: subtotal.saturating_add(cgst).saturating_add(sgst),
    }
  }
}
