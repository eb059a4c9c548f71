pub mod add_product;
pub mod customer_editor;
pub mod delete_product;
pub mod update_agency_profile;

pub use add_product::{AddProductCommand, AddProductResponse, AddProductUseCase};
pub use customer_editor::{CustomerEditor, SaveCustomerCommand, SaveCustomerResponse};
pub use delete_product::{DeleteProductCommand, DeleteProductUseCase};
pub use update_agency_profile::{UpdateAgencyProfileCommand, UpdateAgencyProfileUseCase};
