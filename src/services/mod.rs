pub mod access_service;
pub mod registration_service;

pub use access_service::{authorize, load_authorized, OwnedResource};
pub use registration_service::{NovaConta, Origem, RegistrationError, RegistrationService};
