pub mod entities;
pub mod errors;
pub mod reference;
pub mod value_objects;

pub use entities::{AgencyProfile, Customer, Product};
pub use errors::RegistryError;
pub use reference::ReferenceData;
pub use value_objects::{Gstin, HsnCode, MobileNumber, ValidationError};
