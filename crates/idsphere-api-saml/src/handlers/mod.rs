//! SAML HTTP handlers.

pub mod authorize;
pub mod metadata;
pub mod sp_metadata;

pub use authorize::{authorize_get_handler, authorize_post_handler};
pub use metadata::metadata_handler;
pub use sp_metadata::sp_metadata_handler;
