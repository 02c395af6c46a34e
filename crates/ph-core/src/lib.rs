pub mod error;
pub mod models;
pub mod services;

pub use error::{RegistryError, Result};
pub use services::registry::Registry;
