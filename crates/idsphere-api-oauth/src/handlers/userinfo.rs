//! Userinfo endpoint.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use idsphere_auth::{extract_bearer, AuthError};

use crate::error::OAuthError;
use crate::router::OAuthState;

/// `GET /api/v1/sso/oauth/userinfo` — bearer-authenticated subject claims.
pub async fn userinfo_handler(State(state): State<OAuthState>, headers: HeaderMap) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return OAuthError::Auth(AuthError::MissingToken).into_response();
    };

    match state.userinfo_service.userinfo(token).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            tracing::warn!(kind = %e.kind(), "userinfo rejected: {e}");
            e.into_response()
        }
    }
}
