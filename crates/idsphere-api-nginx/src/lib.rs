//! Reverse-proxy cookie-token authentication for IDSphere.
//!
//! The lightest of the four protocols: login mints an encrypted opaque
//! token carried back to the proxy-fronted application, and the proxy's
//! `auth_request` subrequest redeems it here on every hit. Tokens live
//! twelve hours and are not single-use.

pub mod error;
pub mod handlers;
pub mod router;
pub mod service;

pub use error::{NginxError, NginxResult};
pub use router::{nginx_router, NginxState};
pub use service::{NginxAuthService, NginxGrant};
