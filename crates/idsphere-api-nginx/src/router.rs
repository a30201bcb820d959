//! Cookie-auth router and state.

use axum::routing::get;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use idsphere_secrets::TicketCipher;

use crate::handlers::cookie_auth_handler;
use crate::service::NginxAuthService;

/// Shared state for the cookie-auth endpoints.
#[derive(Clone)]
pub struct NginxState {
    pub auth_service: Arc<NginxAuthService>,
}

impl NginxState {
    /// Wire the auth service over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool, cipher: TicketCipher) -> Self {
        Self {
            auth_service: Arc::new(NginxAuthService::new(pool, cipher)),
        }
    }
}

/// Router for the `/api/v1/sso/cookie` subtree.
pub fn nginx_router(state: NginxState) -> Router {
    Router::new()
        .route("/auth", get(cookie_auth_handler))
        .with_state(state)
}
