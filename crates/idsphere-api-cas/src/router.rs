//! CAS router and state.

use axum::routing::get;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use crate::handlers::service_validate_handler;
use crate::services::CasTicketService;

/// Shared state for the CAS endpoints.
#[derive(Clone)]
pub struct CasState {
    pub ticket_service: Arc<CasTicketService>,
}

impl CasState {
    /// Wire the ticket service over the shared pool and HMAC secret.
    #[must_use]
    pub fn new(pool: PgPool, secret: String) -> Self {
        Self {
            ticket_service: Arc::new(CasTicketService::new(pool, secret)),
        }
    }
}

/// Router for the `/p3` subtree.
pub fn cas_router(state: CasState) -> Router {
    Router::new()
        .route("/serviceValidate", get(service_validate_handler))
        .with_state(state)
}
