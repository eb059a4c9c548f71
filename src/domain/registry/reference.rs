use super::entities::{AgencyProfile, Customer, Product};

/// The latest known contents of the three registries.
///
/// Each field is replaced wholesale when a new snapshot of its collection
/// arrives; fields are independent of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
  pub products: Vec<Product>,
  pub customers: Vec<Customer>,
  pub agency: AgencyProfile,
}

impl ReferenceData {
  /// Empty registries with `agency` standing in until a stored profile arrives
  pub fn new(agency: AgencyProfile) -> Self {
    Self {
      products: Vec::new(),
      customers: Vec::new(),
      agency,
    }
  }

  pub fn find_product(&self, id: &str) -> Option<&Product> {
    self.products.iter().find(|p| p.id == id)
  }

  pub fn find_customer(&self, id: &str) -> Option<&Customer> {
    self.customers.iter().find(|c| c.id == id)
  }
}
