//! CAS XML response rendering.

pub mod response;

pub use response::{failure_response, success_response};
