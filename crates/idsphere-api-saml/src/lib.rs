//! SAML 2.0 identity provider for IDSphere.
//!
//! This crate covers the SP-initiated flow the platform federates with:
//! - `AuthnRequest` decoding (HTTP-Redirect and HTTP-POST bindings)
//! - request signature validation against the SP certificate
//! - a signed `Response` carrying a signed `Assertion`, with the vendor
//!   attribute overrides the cloud consoles require
//! - IdP metadata publishing
//! - SP metadata resolution for relying-party registration

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod saml;
pub mod services;

pub use error::{SamlError, SamlResult};
pub use models::SpMetadata;
pub use router::{saml_router, SamlState};
pub use services::authorize::{SamlAuthorizeRequest, SamlAuthorizeService, SamlGrant};
