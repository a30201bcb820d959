//! Bearer extraction and revocation-aware validation.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::claims::OAuthClaims;
use crate::error::AuthError;
use crate::jwt::decode_token;
use crate::revocation::RevocationCache;

/// Pull the raw bearer string out of the `Authorization` header.
#[must_use]
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Authenticate a request by its bearer token.
///
/// Revocation is consulted before the signature: a logged-out bearer is
/// rejected even while its `exp` is still in the future.
pub async fn authenticate_bearer(
    headers: &HeaderMap,
    public_key_pem: &[u8],
    revocation: &RevocationCache,
) -> Result<OAuthClaims, AuthError> {
    let token = extract_bearer(headers).ok_or(AuthError::MissingToken)?;

    if revocation.is_revoked(token).await? {
        return Err(AuthError::Revoked);
    }

    decode_token(token, public_key_pem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with("bearer abc");
        assert_eq!(extract_bearer(&headers), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(extract_bearer(&headers_with("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer(&headers_with("Bearer")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
