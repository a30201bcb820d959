//! SP-initiated SSO endpoint, both bindings.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use idsphere_auth::authenticate_bearer;

use crate::error::SamlError;
use crate::router::SamlState;
use crate::services::authorize::SamlAuthorizeRequest;

/// SAML authorize parameters, query or form encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct SamlAuthorizeParams {
    #[serde(rename = "SAMLRequest")]
    pub saml_request: String,
    #[serde(rename = "RelayState", default)]
    pub relay_state: String,
    #[serde(rename = "SigAlg", default)]
    pub sig_alg: String,
    #[serde(rename = "Signature", default)]
    pub signature: String,
}

impl From<SamlAuthorizeParams> for SamlAuthorizeRequest {
    fn from(params: SamlAuthorizeParams) -> Self {
        Self {
            saml_request: params.saml_request,
            relay_state: params.relay_state,
            sig_alg: params.sig_alg,
            signature: params.signature,
        }
    }
}

/// `GET /api/v1/sso/saml/authorize` — Redirect binding.
pub async fn authorize_get_handler(
    State(state): State<SamlState>,
    headers: HeaderMap,
    Query(params): Query<SamlAuthorizeParams>,
) -> Response {
    handle_authorize(state, headers, params.into()).await
}

/// `POST /api/v1/sso/saml/authorize` — POST binding.
pub async fn authorize_post_handler(
    State(state): State<SamlState>,
    headers: HeaderMap,
    Form(params): Form<SamlAuthorizeParams>,
) -> Response {
    handle_authorize(state, headers, params.into()).await
}

async fn handle_authorize(
    state: SamlState,
    headers: HeaderMap,
    request: SamlAuthorizeRequest,
) -> Response {
    let claims = match authenticate_bearer(&headers, &state.public_key, &state.revocation).await {
        Ok(claims) => claims,
        Err(e) => return SamlError::Auth(e).into_response(),
    };

    match state.authorize_service.authorize(&request, claims.id).await {
        Ok(grant) => Html(grant.html).into_response(),
        Err(e) => {
            tracing::warn!(
                site = %e.site_name(),
                user_id = claims.id,
                kind = %e.kind(),
                "SAML authorize failed: {e}"
            );
            e.into_response()
        }
    }
}
