//! IdP metadata rendering.

use crate::error::SamlResult;
use crate::saml::{SigningCredentials, NAMEID_FORMAT_UNSPECIFIED};

const REDIRECT_BINDING: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect";
const POST_BINDING: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";

/// Generator for the published `EntityDescriptor`.
///
/// A `SingleLogoutService` is advertised for SP compatibility even though
/// the platform's logout endpoint only revokes the platform bearer; SAML
/// Single Logout semantics are not implemented.
pub struct MetadataGenerator {
    external_url: String,
    credentials: SigningCredentials,
}

impl MetadataGenerator {
    /// Create a generator for the configured external origin.
    #[must_use]
    pub fn new(external_url: String, credentials: SigningCredentials) -> Self {
        Self {
            external_url,
            credentials,
        }
    }

    /// Render the IdP metadata XML.
    pub fn generate(&self) -> SamlResult<String> {
        let ext = self.external_url.trim_end_matches('/');
        let certificate = self.credentials.certificate_base64_der()?;

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(
            "<EntityDescriptor xmlns=\"urn:oasis:names:tc:SAML:2.0:metadata\" entityID=\"",
        );
        xml.push_str(ext);
        xml.push_str("\">\n    <IDPSSODescriptor WantAuthnRequestsSigned=\"false\" protocolSupportEnumeration=\"urn:oasis:names:tc:SAML:2.0:protocol\">\n");
        xml.push_str("        <KeyDescriptor use=\"signing\">\n            <KeyInfo xmlns=\"http://www.w3.org/2000/09/xmldsig#\">\n                <X509Data>\n                    <X509Certificate>");
        xml.push_str(&certificate);
        xml.push_str("</X509Certificate>\n                </X509Data>\n            </KeyInfo>\n        </KeyDescriptor>\n");
        xml.push_str("        <NameIDFormat>");
        xml.push_str(NAMEID_FORMAT_UNSPECIFIED);
        xml.push_str("</NameIDFormat>\n");
        xml.push_str("        <SingleSignOnService Binding=\"");
        xml.push_str(REDIRECT_BINDING);
        xml.push_str("\" Location=\"");
        xml.push_str(ext);
        xml.push_str("/login\"/>\n        <SingleSignOnService Binding=\"");
        xml.push_str(POST_BINDING);
        xml.push_str("\" Location=\"");
        xml.push_str(ext);
        xml.push_str("/api/v1/sso/saml/post\"/>\n        <SingleLogoutService Binding=\"");
        xml.push_str(POST_BINDING);
        xml.push_str("\" Location=\"");
        xml.push_str(ext);
        xml.push_str("/api/auth/logout\"/>\n    </IDPSSODescriptor>\n");
        xml.push_str("    <Organization>\n        <OrganizationName xml:lang=\"en\">IDSphere</OrganizationName>\n        <OrganizationDisplayName xml:lang=\"zh\">IDSphere 统一认证平台</OrganizationDisplayName>\n        <OrganizationURL xml:lang=\"en\">");
        xml.push_str(ext);
        xml.push_str("</OrganizationURL>\n    </Organization>\n</EntityDescriptor>");

        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> MetadataGenerator {
        use openssl::asn1::Asn1Time;
        use openssl::nid::Nid;
        use openssl::pkey::PKey;
        use openssl::rsa::Rsa;
        use openssl::x509::{X509NameBuilder, X509};

        let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, "idsphere-idp").unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&pkey).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        builder
            .sign(&pkey, openssl::hash::MessageDigest::sha256())
            .unwrap();
        let cert = builder.build();

        let credentials = SigningCredentials::from_pem(
            &String::from_utf8(pkey.private_key_to_pem_pkcs8().unwrap()).unwrap(),
            &String::from_utf8(cert.to_pem().unwrap()).unwrap(),
        )
        .unwrap();

        MetadataGenerator::new("https://sso.example.com".to_string(), credentials)
    }

    #[test]
    fn advertises_both_sso_bindings() {
        let xml = generator().generate().unwrap();
        assert!(xml.contains(&format!(
            "Binding=\"{REDIRECT_BINDING}\" Location=\"https://sso.example.com/login\""
        )));
        assert!(xml.contains(&format!(
            "Binding=\"{POST_BINDING}\" Location=\"https://sso.example.com/api/v1/sso/saml/post\""
        )));
    }

    #[test]
    fn advertises_logout_service_without_implementing_slo() {
        let xml = generator().generate().unwrap();
        assert!(xml.contains("SingleLogoutService"));
        assert!(xml.contains("https://sso.example.com/api/auth/logout"));
    }

    #[test]
    fn embeds_signing_certificate_and_organization() {
        let xml = generator().generate().unwrap();
        assert!(xml.contains("<KeyDescriptor use=\"signing\">"));
        assert!(xml.contains("<X509Certificate>MII"));
        assert!(xml.contains("IDSphere 统一认证平台"));
        assert!(xml.contains("entityID=\"https://sso.example.com\""));
    }
}
