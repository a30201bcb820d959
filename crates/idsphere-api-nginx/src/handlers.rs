//! Proxy subrequest validation handler.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::NginxError;
use crate::router::NginxState;

/// Query parameters of a validation subrequest.
#[derive(Debug, Default, Deserialize)]
pub struct CookieAuthQuery {
    #[serde(default)]
    pub token: String,
}

/// Subject claims returned to the proxy on a hit.
#[derive(Debug, Serialize)]
pub struct CookieAuthResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
}

/// `GET /api/v1/sso/cookie/auth` — the Nginx `auth_request` target. The
/// token rides in the `token` query parameter or a cookie of the same
/// name.
pub async fn cookie_auth_handler(
    State(state): State<NginxState>,
    headers: HeaderMap,
    Query(query): Query<CookieAuthQuery>,
) -> Response {
    let token = if query.token.is_empty() {
        cookie_token(&headers).unwrap_or_default()
    } else {
        query.token
    };

    if token.is_empty() {
        return NginxError::InvalidToken.into_response();
    }

    match state.auth_service.validate(&token).await {
        Ok(subject) => Json(CookieAuthResponse {
            id: subject.id,
            name: subject.name,
            username: subject.username,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(kind = %e.kind(), "cookie-auth validation failed: {e}");
            e.into_response()
        }
    }
}

/// Pull a `token` cookie out of the `Cookie` header.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token").then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_token_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; token=enc-token; theme=dark"),
        );
        assert_eq!(cookie_token(&headers), Some("enc-token".to_string()));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        assert_eq!(cookie_token(&headers), None);
        assert_eq!(cookie_token(&HeaderMap::new()), None);
    }
}
