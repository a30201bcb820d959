//! OAuth services.

pub mod authorization;
pub mod token;
pub mod userinfo;

pub use authorization::{AuthorizationService, OAuthGrant};
pub use token::TokenService;
pub use userinfo::UserinfoService;
