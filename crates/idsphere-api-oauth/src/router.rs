//! OAuth router and state.

use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use idsphere_auth::RevocationCache;
use idsphere_secrets::TicketCipher;

use crate::handlers::{authorize_handler, token_handler, userinfo_handler};
use crate::services::{AuthorizationService, TokenService, UserinfoService};

/// Shared state for the OAuth endpoints.
#[derive(Clone)]
pub struct OAuthState {
    pub authorization_service: Arc<AuthorizationService>,
    pub token_service: Arc<TokenService>,
    pub userinfo_service: Arc<UserinfoService>,
    /// External origin, the OIDC issuer.
    pub issuer: String,
    /// PEM public key for bearer verification and the JWKS.
    pub public_key: Vec<u8>,
    /// Deterministic key id advertised in the JWKS.
    pub key_id: String,
    pub revocation: RevocationCache,
}

impl OAuthState {
    /// Wire the services over the shared pool and key material.
    #[must_use]
    pub fn new(
        pool: PgPool,
        issuer: String,
        cipher: TicketCipher,
        private_key: Vec<u8>,
        public_key: Vec<u8>,
        key_id: String,
        revocation: RevocationCache,
    ) -> Self {
        let authorization_service =
            Arc::new(AuthorizationService::new(pool.clone(), cipher.clone()));
        let token_service = Arc::new(TokenService::new(
            pool.clone(),
            cipher,
            private_key,
            key_id.clone(),
        ));
        let userinfo_service = Arc::new(UserinfoService::new(
            pool,
            public_key.clone(),
            revocation.clone(),
        ));

        Self {
            authorization_service,
            token_service,
            userinfo_service,
            issuer,
            public_key,
            key_id,
            revocation,
        }
    }
}

/// Router for the `/api/v1/sso/oauth` subtree.
pub fn oauth_router(state: OAuthState) -> Router {
    Router::new()
        .route("/authorize", get(authorize_handler))
        .route("/token", post(token_handler))
        .route("/userinfo", get(userinfo_handler))
        .with_state(state)
}
