//! Error handling for Granula.
//! One error enum per concern, `thiserror` only.

pub mod catalog_error;
pub mod config_error;
pub mod granula_error;
pub mod service_error;

pub use catalog_error::CatalogError;
pub use config_error::ConfigError;
pub use granula_error::{GranulaError, GranulaResult};
pub use service_error::ServiceError;
