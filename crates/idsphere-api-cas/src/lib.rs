//! CAS 3.0 provider endpoints for IDSphere.
//!
//! Issues HMAC-signed service tickets after login and validates them on
//! `/p3/serviceValidate`, answering with the Yale-namespace XML that CAS
//! clients parse.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{CasError, CasResult};
pub use router::{cas_router, CasState};
pub use services::ticket::{CasGrant, CasTicketService};
