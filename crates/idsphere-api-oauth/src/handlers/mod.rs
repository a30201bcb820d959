//! OAuth HTTP handlers.

pub mod authorize;
pub mod discovery;
pub mod token;
pub mod userinfo;

pub use authorize::authorize_handler;
pub use discovery::{discovery_handler, jwks_handler};
pub use token::token_handler;
pub use userinfo::userinfo_handler;
