//! SP-initiated SSO orchestration.

use sqlx::PgPool;

use idsphere_core::AuthorizeParams;
use idsphere_db::{SiteRegistry, SubjectStore};

use crate::error::{SamlError, SamlResult};
use crate::models::render_post_form;
use crate::saml::{build_profile, SigningCredentials};
use crate::services::request_parser::RequestParser;
use crate::services::response_builder::ResponseBuilder;
use crate::services::signature_validator::SignatureValidator;

/// The SAML parameter set carried by the deep link.
#[derive(Debug, Clone, Default)]
pub struct SamlAuthorizeRequest {
    pub saml_request: String,
    pub relay_state: String,
    pub sig_alg: String,
    pub signature: String,
}

impl SamlAuthorizeRequest {
    /// Project the SAML fields out of an authorize-parameter bag.
    #[must_use]
    pub fn from_params(params: &AuthorizeParams) -> Self {
        Self {
            saml_request: params.saml_request().to_string(),
            relay_state: params.relay_state().to_string(),
            sig_alg: params.sig_alg().to_string(),
            signature: params.signature().to_string(),
        }
    }
}

/// Result of a successful SAML authorize call.
#[derive(Debug, Clone)]
pub struct SamlGrant {
    /// Auto-POSTing HTML page, served with `text/html`.
    pub html: String,
    /// Resolved site name, for the audit log.
    pub site_name: String,
}

/// Service consuming an `AuthnRequest` and producing the response form.
#[derive(Clone)]
pub struct SamlAuthorizeService {
    registry: SiteRegistry,
    subjects: SubjectStore,
    external_url: String,
    credentials: SigningCredentials,
}

impl SamlAuthorizeService {
    /// Create a new service over the shared pool and IdP credentials.
    #[must_use]
    pub fn new(pool: PgPool, external_url: String, credentials: SigningCredentials) -> Self {
        Self {
            registry: SiteRegistry::new(pool.clone()),
            subjects: SubjectStore::new(pool),
            external_url,
            credentials,
        }
    }

    /// Parse the request, resolve the SP, enforce access, validate the
    /// request signature, and build the signed response form.
    pub async fn authorize(
        &self,
        request: &SamlAuthorizeRequest,
        user_id: i64,
    ) -> SamlResult<SamlGrant> {
        let parsed = RequestParser::parse(&request.saml_request)?;

        let site = self
            .registry
            .find_saml_site(&parsed.issuer)
            .await?
            .ok_or(SamlError::AppUnregistered)?;

        if !self.registry.user_can_access(user_id, &site).await? {
            return Err(SamlError::AccessDenied { site: site.name });
        }

        let sp_certificate = site.sp_certificate_pem().ok_or_else(|| {
            SamlError::CertificateParseError(format!(
                "site {} has no SP certificate configured",
                site.name
            ))
        })?;

        self.validate_request_signature(request, &sp_certificate)?;

        let subject = self
            .subjects
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| SamlError::Internal(format!("subject {user_id} not found")))?;

        let acs_url = parsed
            .assertion_consumer_service_url
            .as_deref()
            .unwrap_or(&site.callback_url)
            .to_string();

        let profile = build_profile(&site, &subject, &parsed.issuer);
        let session_index = uuid::Uuid::new_v4().to_string();

        let builder = ResponseBuilder::new(self.external_url.clone(), self.credentials.clone());
        let saml_response = builder.build_signed_response(
            &profile,
            &parsed.issuer,
            &acs_url,
            Some(&parsed.id),
            &session_index,
        )?;

        tracing::info!(
            site = %site.name,
            user_id,
            sp_entity_id = %parsed.issuer,
            acs_url = %acs_url,
            "issued SAML response"
        );

        Ok(SamlGrant {
            html: render_post_form(&acs_url, &saml_response, &request.relay_state),
            site_name: site.name,
        })
    }

    /// Validate the request twice: first as a Redirect-binding signature
    /// over the URL-encoded parameters, then as a POST-binding signature
    /// embedded in the XML. Either success accepts the request; the
    /// second validator's error propagates when both fail.
    fn validate_request_signature(
        &self,
        request: &SamlAuthorizeRequest,
        sp_certificate: &str,
    ) -> SamlResult<()> {
        let redirect_result = if request.sig_alg.is_empty() || request.signature.is_empty() {
            Err(SamlError::SignatureValidationFailed(
                "no redirect-binding signature parameters".to_string(),
            ))
        } else {
            SignatureValidator::validate_redirect_signature(
                &urlencoding::encode(&request.saml_request),
                Some(&urlencoding::encode(&request.relay_state)),
                &urlencoding::encode(&request.sig_alg),
                &request.signature,
                sp_certificate,
            )
        };
        if redirect_result.is_ok() {
            return Ok(());
        }

        let xml = RequestParser::decode_xml(&request.saml_request)?;
        SignatureValidator::validate_post_signature(&xml, sp_certificate)
    }
}
