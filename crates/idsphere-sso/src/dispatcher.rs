//! Engine selection and login completion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use idsphere_api_cas::{CasError, CasTicketService};
use idsphere_api_nginx::{NginxAuthService, NginxError};
use idsphere_api_oauth::{AuthorizationService, AuthorizeRequest, OAuthError};
use idsphere_api_saml::{SamlAuthorizeRequest, SamlAuthorizeService, SamlError};
use idsphere_core::{AuthorizeParams, SsoErrorKind};
use idsphere_db::models::Subject;

/// The four protocol engines, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    OAuth,
    Cas,
    Saml,
    Nginx,
}

/// First-match engine selection over the parameter bag.
///
/// The order is significant and fixed: OAuth, then CAS, then SAML, then
/// Nginx. A bag satisfying several triggers always selects the earliest.
#[must_use]
pub fn select_engine(params: &AuthorizeParams) -> Option<Protocol> {
    if !params.response_type().is_empty()
        && !params.client_id().is_empty()
        && !params.redirect_uri().is_empty()
    {
        Some(Protocol::OAuth)
    } else if !params.service().is_empty() {
        Some(Protocol::Cas)
    } else if !params.saml_request().is_empty() {
        Some(Protocol::Saml)
    } else if !params.callback_url().is_empty() {
        Some(Protocol::Nginx)
    } else {
        None
    }
}

/// What the login flow hands back to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Redirect to the relying party's callback.
    Redirect(String),
    /// Auto-POSTing HTML form (SAML).
    Html(String),
    /// No federation parameters were present; plain platform login.
    Empty,
}

/// Engine failure surfaced on the login endpoint.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    OAuth(#[from] OAuthError),
    #[error(transparent)]
    Cas(#[from] CasError),
    #[error(transparent)]
    Saml(#[from] SamlError),
    #[error(transparent)]
    Nginx(#[from] NginxError),
}

impl LoginError {
    /// Protocol-neutral kind, for the audit log.
    #[must_use]
    pub fn kind(&self) -> SsoErrorKind {
        match self {
            LoginError::OAuth(e) => e.kind(),
            LoginError::Cas(e) => e.kind(),
            LoginError::Saml(e) => e.kind(),
            LoginError::Nginx(e) => e.kind(),
        }
    }

    /// The resolved site name, when the engine got that far.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            LoginError::OAuth(e) => e.site_name(),
            LoginError::Cas(e) => e.site_name(),
            LoginError::Saml(e) => e.site_name(),
            LoginError::Nginx(e) => e.site_name(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u32,
    msg: String,
}

impl IntoResponse for LoginError {
    /// The login surface is always the JSON envelope, whichever engine
    /// failed.
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            SsoErrorKind::AccessDenied | SsoErrorKind::RevokedToken => StatusCode::UNAUTHORIZED,
            SsoErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = ErrorBody {
            code: kind.code(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// The dispatcher owning one instance of each engine.
#[derive(Clone)]
pub struct SsoDispatcher {
    oauth: AuthorizationService,
    cas: CasTicketService,
    saml: SamlAuthorizeService,
    nginx: NginxAuthService,
}

impl SsoDispatcher {
    /// Compose the four engines.
    #[must_use]
    pub fn new(
        oauth: AuthorizationService,
        cas: CasTicketService,
        saml: SamlAuthorizeService,
        nginx: NginxAuthService,
    ) -> Self {
        Self {
            oauth,
            cas,
            saml,
            nginx,
        }
    }

    /// Complete a login: route the parameter bag to exactly one engine
    /// and return its outcome plus the resolved site name.
    pub async fn login(
        &self,
        params: &AuthorizeParams,
        subject: &Subject,
    ) -> Result<(LoginOutcome, String), LoginError> {
        match select_engine(params) {
            Some(Protocol::OAuth) => {
                let request = AuthorizeRequest::from_params(params);
                let grant = self.oauth.authorize(&request, subject.id).await?;
                Ok((LoginOutcome::Redirect(grant.redirect_uri), grant.site_name))
            }
            Some(Protocol::Cas) => {
                let grant = self
                    .cas
                    .authorize(params.service(), subject.id, &subject.username)
                    .await?;
                Ok((LoginOutcome::Redirect(grant.redirect_uri), grant.site_name))
            }
            Some(Protocol::Saml) => {
                let request = SamlAuthorizeRequest::from_params(params);
                let grant = self.saml.authorize(&request, subject.id).await?;
                Ok((LoginOutcome::Html(grant.html), grant.site_name))
            }
            Some(Protocol::Nginx) => {
                let grant = self
                    .nginx
                    .authorize(params.callback_url(), subject.id)
                    .await?;
                Ok((LoginOutcome::Redirect(grant.redirect_uri), grant.site_name))
            }
            None => Ok((LoginOutcome::Empty, String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> AuthorizeParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn oauth_requires_all_three_triggers() {
        let params = bag(&[
            ("response_type", "code"),
            ("client_id", "demo"),
            ("redirect_uri", "https://app/cb"),
        ]);
        assert_eq!(select_engine(&params), Some(Protocol::OAuth));

        let partial = bag(&[("response_type", "code"), ("client_id", "demo")]);
        assert_eq!(select_engine(&partial), None);
    }

    #[test]
    fn cas_matches_on_service() {
        let params = bag(&[("service", "https://app/cas")]);
        assert_eq!(select_engine(&params), Some(Protocol::Cas));
    }

    #[test]
    fn saml_matches_on_saml_request() {
        let params = bag(&[("SAMLRequest", "ZmFrZQ==")]);
        assert_eq!(select_engine(&params), Some(Protocol::Saml));
    }

    #[test]
    fn nginx_matches_on_callback_url() {
        let params = bag(&[("callback_url", "https://grafana/cb")]);
        assert_eq!(select_engine(&params), Some(Protocol::Nginx));
    }

    #[test]
    fn empty_bag_selects_nothing() {
        assert_eq!(select_engine(&bag(&[])), None);
    }

    #[test]
    fn oauth_wins_over_every_later_trigger() {
        let params = bag(&[
            ("response_type", "code"),
            ("client_id", "demo"),
            ("redirect_uri", "https://app/cb"),
            ("service", "https://app/cas"),
            ("SAMLRequest", "ZmFrZQ=="),
            ("callback_url", "https://grafana/cb"),
        ]);
        assert_eq!(select_engine(&params), Some(Protocol::OAuth));
    }

    #[test]
    fn cas_wins_over_saml_and_nginx() {
        let params = bag(&[
            ("service", "https://app/cas"),
            ("SAMLRequest", "ZmFrZQ=="),
            ("callback_url", "https://grafana/cb"),
        ]);
        assert_eq!(select_engine(&params), Some(Protocol::Cas));
    }

    #[test]
    fn saml_wins_over_nginx() {
        let params = bag(&[
            ("SAMLRequest", "ZmFrZQ=="),
            ("callback_url", "https://grafana/cb"),
        ]);
        assert_eq!(select_engine(&params), Some(Protocol::Saml));
    }

    #[test]
    fn incomplete_oauth_falls_through_to_cas() {
        // Missing redirect_uri disqualifies OAuth; the bag still carries
        // a CAS trigger.
        let params = bag(&[
            ("response_type", "code"),
            ("client_id", "demo"),
            ("service", "https://app/cas"),
        ]);
        assert_eq!(select_engine(&params), Some(Protocol::Cas));
    }
}
