//! Request and response models for the OAuth endpoints.

pub mod authorize;
pub mod discovery;
pub mod token;
pub mod userinfo;

pub use authorize::AuthorizeRequest;
pub use discovery::OidcConfiguration;
pub use token::{ResponseToken, TokenRequest};
pub use userinfo::ResponseUserinfo;
