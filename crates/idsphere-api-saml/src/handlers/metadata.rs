//! IdP metadata endpoint.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::router::SamlState;
use crate::services::MetadataGenerator;

/// `GET /api/v1/sso/saml/metadata` — the published `EntityDescriptor`.
pub async fn metadata_handler(State(state): State<SamlState>) -> Response {
    let generator =
        MetadataGenerator::new(state.external_url.clone(), state.credentials.clone());
    match generator.generate() {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
