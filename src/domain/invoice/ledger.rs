use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::entities::Invoice;
use super::value_objects::FilingPath;

/// Invoices whose customer name or invoice number contains `query`,
/// ignoring case, newest first. An empty query matches everything; the
/// query is not trimmed.
pub fn search<'a>(invoices: &'a [Invoice], query: &str) -> Vec<&'a Invoice> {
  let needle = query.to_lowercase();
  let mut matches: Vec<&Invoice> = invoices
    .iter()
    .filter(|invoice| needle.is_empty() || matches_query(invoice, &needle))
    .collect();
  matches.sort_by(|a, b| newest_first(a, b));
  matches
}

/// Invoices grouped by their `year/Month` folder, folders in calendar order,
/// newest first within a group
pub fn group_by_filing_path(invoices: &[Invoice]) -> BTreeMap<FilingPath, Vec<&Invoice>> {
  let mut groups: BTreeMap<FilingPath, Vec<&Invoice>> = BTreeMap::new();
  for invoice in invoices {
    groups
      .entry(invoice.snapshot.filing_path.clone())
      .or_default()
      .push(invoice);
  }
  for group in groups.values_mut() {
    group.sort_by(|a, b| newest_first(a, b));
  }
  groups
}

fn matches_query(invoice: &Invoice, needle: &str) -> bool {
  invoice.snapshot.customer_name.to_lowercase().contains(needle)
    || invoice.snapshot.invoice_number.to_lowercase().contains(needle)
}

// Ties on createdAt fall back to id so the order is total
fn newest_first(a: &Invoice, b: &Invoice) -> Ordering {
  b.snapshot
    .created_at
    .cmp(&a.snapshot.created_at)
    .then_with(|| b.id.cmp(&a.id))
}
