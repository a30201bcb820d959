//! OIDC discovery and JWKS endpoints.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use idsphere_auth::build_jwks;

use crate::error::OAuthError;
use crate::models::OidcConfiguration;
use crate::router::OAuthState;

/// `GET /.well-known/openid-configuration`.
pub async fn discovery_handler(State(state): State<OAuthState>) -> Json<OidcConfiguration> {
    Json(OidcConfiguration::new(&state.issuer))
}

/// `GET /api/v1/sso/oidc/jwks` — the platform's single signing key.
pub async fn jwks_handler(State(state): State<OAuthState>) -> Response {
    match build_jwks(&state.public_key, &state.key_id) {
        Ok(jwks) => Json(jwks).into_response(),
        Err(e) => OAuthError::Auth(e).into_response(),
    }
}
