//! `/p3/serviceValidate` handler.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::models::success_response;
use crate::router::CasState;

/// Query parameters of a validation request.
#[derive(Debug, Deserialize)]
pub struct ServiceValidateQuery {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub ticket: String,
}

/// `GET /p3/serviceValidate` — single-use ticket redemption, XML out.
pub async fn service_validate_handler(
    State(state): State<CasState>,
    Query(query): Query<ServiceValidateQuery>,
) -> Response {
    match state
        .ticket_service
        .service_validate(&query.service, &query.ticket)
        .await
    {
        Ok(subject) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            success_response(&subject),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(
                service = %query.service,
                kind = %e.kind(),
                "CAS serviceValidate failed: {e}"
            );
            e.into_response()
        }
    }
}
