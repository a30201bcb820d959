//! SP metadata resolution endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::SpMetadataRequest;
use crate::router::SamlState;

/// `POST /api/v1/sso/saml/sp-metadata` — fetch a SP metadata URL and
/// return its entity id and signing certificate.
pub async fn sp_metadata_handler(
    State(state): State<SamlState>,
    Json(request): Json<SpMetadataRequest>,
) -> Response {
    match state.resolver.resolve(&request.sp_metadata_url).await {
        Ok(metadata) => Json(metadata).into_response(),
        Err(e) => {
            tracing::warn!(
                url = %request.sp_metadata_url,
                "SP metadata resolution failed: {e}"
            );
            e.into_response()
        }
    }
}
