//! CAS HTTP handlers.

pub mod validate;

pub use validate::service_validate_handler;
