//! SAML request/response models.

pub mod post_form;
pub mod sp_metadata;

pub use post_form::render_post_form;
pub use sp_metadata::{SpMetadata, SpMetadataRequest};
