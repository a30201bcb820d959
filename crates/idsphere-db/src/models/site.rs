//! Relying-party (site) entity model.

use sqlx::FromRow;

/// Protocol discriminator values for [`Site::sso_type`].
pub const SSO_TYPE_OAUTH: &str = "oauth";
pub const SSO_TYPE_CAS: &str = "cas";
pub const SSO_TYPE_SAML: &str = "saml";
pub const SSO_TYPE_NGINX: &str = "nginx";

/// A registered relying party.
///
/// One row carries the protocol keys for whichever protocol the site
/// federates with: `client_id`/`client_secret` for OAuth, `callback_url`
/// as the CAS service prefix and Nginx callback, `entity_id` plus the SP
/// `certificate` for SAML. `domain_id`, `redirect_url`, `idp_name` and
/// `address` feed the vendor-specific SAML attribute overrides.
#[derive(Debug, Clone, FromRow)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub sso_type: String,
    pub all_open: bool,
    pub callback_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub entity_id: Option<String>,
    pub certificate: Option<String>,
    pub domain_id: Option<String>,
    pub redirect_url: Option<String>,
    pub idp_name: Option<String>,
    pub address: Option<String>,
}

impl Site {
    /// The SP certificate with PEM headers, adding them when the stored
    /// value is a bare base64 body.
    #[must_use]
    pub fn sp_certificate_pem(&self) -> Option<String> {
        let cert = self.certificate.as_deref()?;
        if cert.contains("-----BEGIN CERTIFICATE-----") {
            Some(cert.to_string())
        } else {
            Some(format!(
                "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n",
                cert.trim()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_with_cert(cert: Option<&str>) -> Site {
        Site {
            id: 1,
            name: "huawei-cloud".to_string(),
            sso_type: SSO_TYPE_SAML.to_string(),
            all_open: true,
            callback_url: "https://auth.example.com/acs".to_string(),
            client_id: None,
            client_secret: None,
            entity_id: Some("https://auth.example.com".to_string()),
            certificate: cert.map(String::from),
            domain_id: Some("123".to_string()),
            redirect_url: None,
            idp_name: None,
            address: None,
        }
    }

    #[test]
    fn bare_certificate_gains_pem_headers() {
        let site = site_with_cert(Some("MIIC000"));
        let pem = site.sp_certificate_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.contains("MIIC000"));
        assert!(pem.trim_end().ends_with("-----END CERTIFICATE-----"));
    }

    #[test]
    fn pem_certificate_is_passed_through() {
        let pem = "-----BEGIN CERTIFICATE-----\nMIIC000\n-----END CERTIFICATE-----";
        let site = site_with_cert(Some(pem));
        assert_eq!(site.sp_certificate_pem().unwrap(), pem);
    }

    #[test]
    fn missing_certificate_yields_none() {
        assert!(site_with_cert(None).sp_certificate_pem().is_none());
    }
}
