//! SAML router and state.

use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use idsphere_auth::RevocationCache;

use crate::error::SamlResult;
use crate::handlers::{
    authorize_get_handler, authorize_post_handler, metadata_handler, sp_metadata_handler,
};
use crate::saml::SigningCredentials;
use crate::services::authorize::SamlAuthorizeService;
use crate::services::SpMetadataResolver;

/// Shared state for the SAML endpoints.
#[derive(Clone)]
pub struct SamlState {
    pub authorize_service: Arc<SamlAuthorizeService>,
    pub resolver: Arc<SpMetadataResolver>,
    pub external_url: String,
    pub credentials: SigningCredentials,
    /// PEM public key for bearer verification.
    pub public_key: Vec<u8>,
    pub revocation: RevocationCache,
}

impl SamlState {
    /// Wire the services over the shared pool and IdP credentials.
    pub fn new(
        pool: PgPool,
        external_url: String,
        credentials: SigningCredentials,
        public_key: Vec<u8>,
        revocation: RevocationCache,
    ) -> SamlResult<Self> {
        let authorize_service = Arc::new(SamlAuthorizeService::new(
            pool,
            external_url.clone(),
            credentials.clone(),
        ));
        let resolver = Arc::new(SpMetadataResolver::new()?);

        Ok(Self {
            authorize_service,
            resolver,
            external_url,
            credentials,
            public_key,
            revocation,
        })
    }
}

/// Router for the `/api/v1/sso/saml` subtree.
pub fn saml_router(state: SamlState) -> Router {
    Router::new()
        .route("/metadata", get(metadata_handler))
        .route(
            "/authorize",
            get(authorize_get_handler).post(authorize_post_handler),
        )
        // The POST SSO location advertised in the IdP metadata.
        .route("/post", post(authorize_post_handler))
        .route("/sp-metadata", post(sp_metadata_handler))
        .with_state(state)
}
