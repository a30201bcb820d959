//! Login completion and logout.
//!
//! The authentication front-ends (password + MFA, scan login) live
//! outside this service; they hand over an authenticated subject as a
//! platform bearer. Login completion routes the deep-link's authorize
//! parameters to exactly one protocol engine and returns the redirect or
//! the SAML auto-POST form.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use idsphere_auth::{authenticate_bearer, extract_bearer, RevocationCache};
use idsphere_core::AuthorizeParams;
use idsphere_db::SubjectStore;
use idsphere_sso::{LoginOutcome, SsoDispatcher};

/// Shared state for the auth routes.
#[derive(Clone)]
pub struct AuthState {
    pub dispatcher: SsoDispatcher,
    pub subjects: SubjectStore,
    pub public_key: Vec<u8>,
    pub revocation: RevocationCache,
}

/// Router for `/api/auth`.
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .with_state(state)
}

/// Login-completion request: the untyped parameter bag the front-end
/// carried from the original deep link.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// `POST /api/auth/login` — complete a federated login for the
/// bearer-authenticated subject.
async fn login_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let claims = match authenticate_bearer(&headers, &state.public_key, &state.revocation).await {
        Ok(claims) => claims,
        Err(e) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": 90401, "msg": e.to_string()})),
            )
                .into_response()
        }
    };

    let subject = match state.subjects.get_by_id(claims.id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": 90401, "msg": "用户不存在"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("subject lookup failed: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"code": 90500, "msg": "A database error occurred"})),
            )
                .into_response();
        }
    };

    let params = AuthorizeParams::new(request.params);
    match state.dispatcher.login(&params, &subject).await {
        Ok((outcome, site_name)) => {
            tracing::info!(
                site = %site_name,
                user_id = subject.id,
                username = %subject.username,
                "login completed"
            );
            match outcome {
                LoginOutcome::Redirect(redirect_uri) => {
                    Json(json!({"code": 0, "redirect_uri": redirect_uri})).into_response()
                }
                LoginOutcome::Html(html) => {
                    Json(json!({"code": 0, "html": html})).into_response()
                }
                LoginOutcome::Empty => {
                    Json(json!({"code": 0, "redirect_uri": null})).into_response()
                }
            }
        }
        Err(e) => {
            // The site name lands in the audit line even on failure.
            tracing::warn!(
                site = %e.site_name(),
                user_id = subject.id,
                username = %subject.username,
                kind = %e.kind(),
                "login federation failed: {e}"
            );
            e.into_response()
        }
    }
}

/// `POST /api/auth/logout` — park the raw bearer in the revocation KV
/// for 24 hours.
async fn logout_handler(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 90400, "msg": "Missing bearer token"})),
        )
            .into_response();
    };

    match state.revocation.revoke(token).await {
        Ok(()) => Json(json!({"code": 0, "data": null})).into_response(),
        Err(e) => {
            tracing::error!("logout revocation failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"code": 90500, "msg": "An internal error occurred"})),
            )
                .into_response()
        }
    }
}
