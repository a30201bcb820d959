//! Post-login OAuth authorize endpoint.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use idsphere_auth::authenticate_bearer;

use crate::error::OAuthError;
use crate::models::AuthorizeRequest;
use crate::router::OAuthState;

/// `GET /api/v1/sso/oauth/authorize` — resolves the already-authenticated
/// subject from the bearer, mints a code, and 302-redirects back to the
/// relying party.
pub async fn authorize_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizeRequest>,
) -> Response {
    let claims = match authenticate_bearer(&headers, &state.public_key, &state.revocation).await {
        Ok(claims) => claims,
        Err(e) => return OAuthError::Auth(e).into_response(),
    };

    match state
        .authorization_service
        .authorize(&request, claims.id)
        .await
    {
        // Relying parties expect a plain 302 back to their callback.
        Ok(grant) => (
            StatusCode::FOUND,
            [(header::LOCATION, grant.redirect_uri)],
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(
                site = %e.site_name(),
                user_id = claims.id,
                kind = %e.kind(),
                "OAuth authorize failed: {e}"
            );
            e.into_response()
        }
    }
}
