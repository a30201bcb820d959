//! SAML services.

pub mod authorize;
pub mod metadata;
pub mod request_parser;
pub mod response_builder;
pub mod signature_validator;
pub mod sp_metadata;

pub use authorize::SamlAuthorizeService;
pub use metadata::MetadataGenerator;
pub use request_parser::{ParsedAuthnRequest, RequestParser};
pub use response_builder::ResponseBuilder;
pub use signature_validator::SignatureValidator;
pub use sp_metadata::SpMetadataResolver;
