//! Core types shared across the IDSphere SSO federation platform.
//!
//! This crate holds the protocol-neutral building blocks: the error
//! kinds every engine reports, the read-only authorize-parameter bag the
//! protocol dispatcher inspects, and the callback URL helpers.

pub mod error;
pub mod params;
pub mod urls;

pub use error::SsoErrorKind;
pub use params::AuthorizeParams;
pub use urls::append_query;
