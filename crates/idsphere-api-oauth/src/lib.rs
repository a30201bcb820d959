//! OAuth 2.0 / OIDC provider endpoints for IDSphere.
//!
//! Implements the authorization-code flow the platform federates with:
//! authorize (post-login), token exchange, userinfo, the OIDC discovery
//! document and the JWKS. One RS256 JWT backs both `id_token` and
//! `access_token`, which is why userinfo verifies its bearer as a JWT.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{OAuthError, OAuthResult};
pub use models::authorize::AuthorizeRequest;
pub use router::{oauth_router, OAuthState};
pub use services::authorization::{AuthorizationService, OAuthGrant};
pub use services::token::TokenService;
pub use services::userinfo::UserinfoService;
