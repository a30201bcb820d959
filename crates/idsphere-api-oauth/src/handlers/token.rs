//! Token endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};

use crate::models::TokenRequest;
use crate::router::OAuthState;

/// `POST /api/v1/sso/oauth/token` — form-encoded code-for-token exchange.
pub async fn token_handler(
    State(state): State<OAuthState>,
    Form(request): Form<TokenRequest>,
) -> Response {
    match state.token_service.exchange(&request).await {
        Ok(token) => Json(token).into_response(),
        Err(e) => {
            tracing::warn!(
                client_id = %request.client_id,
                kind = %e.kind(),
                "token exchange failed: {e}"
            );
            e.into_response()
        }
    }
}
