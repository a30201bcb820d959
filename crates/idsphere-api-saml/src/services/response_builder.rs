//! Signed `Response` construction.
//!
//! The IdP emits a `samlp:Response` whose assertion is signed first and
//! whose response element is then signed over the result, both as
//! enveloped XMLDSig signatures with exclusive C14N.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use xml_canonicalization::Canonicalizer;

use crate::error::{SamlError, SamlResult};
use crate::saml::{AssertionProfile, SigningCredentials};

/// How long an issued assertion stays acceptable.
const ASSERTION_VALIDITY_SECS: i64 = 300;

/// Backdating tolerance for `NotBefore`.
const NOT_BEFORE_SKEW_SECS: i64 = 120;

/// Builder for signed SAML responses.
pub struct ResponseBuilder {
    issuer: String,
    credentials: SigningCredentials,
}

impl ResponseBuilder {
    /// Create a builder for the configured IdP issuer.
    #[must_use]
    pub fn new(issuer: String, credentials: SigningCredentials) -> Self {
        Self {
            issuer,
            credentials,
        }
    }

    /// Build, sign, and base64-encode a response for the SP.
    pub fn build_signed_response(
        &self,
        profile: &AssertionProfile,
        sp_entity_id: &str,
        acs_url: &str,
        in_response_to: Option<&str>,
        session_index: &str,
    ) -> SamlResult<String> {
        let response_id = format!("_resp_{}", uuid::Uuid::new_v4());
        let assertion_id = format!("_assert_{}", uuid::Uuid::new_v4());
        let now = Utc::now();

        let xml = self.build_response_xml(
            &response_id,
            &assertion_id,
            profile,
            sp_entity_id,
            acs_url,
            in_response_to,
            session_index,
            now,
        );

        let xml = self.insert_enveloped_signature(&xml, &assertion_id, "</saml:Assertion>")?;
        let xml = self.insert_enveloped_signature(&xml, &response_id, "</samlp:Response>")?;

        Ok(STANDARD.encode(xml.as_bytes()))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_response_xml(
        &self,
        response_id: &str,
        assertion_id: &str,
        profile: &AssertionProfile,
        sp_entity_id: &str,
        acs_url: &str,
        in_response_to: Option<&str>,
        session_index: &str,
        now: DateTime<Utc>,
    ) -> String {
        let issue_instant = format_instant(now);
        let not_before = format_instant(now - Duration::seconds(NOT_BEFORE_SKEW_SECS));
        let not_on_or_after = format_instant(now + Duration::seconds(ASSERTION_VALIDITY_SECS));

        let in_response_to_attr = in_response_to
            .map(|id| format!(" InResponseTo=\"{}\"", xml_escape(id)))
            .unwrap_or_default();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<samlp:Response xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\"\n");
        xml.push_str("    xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\"\n    ID=\"");
        xml.push_str(&xml_escape(response_id));
        xml.push_str("\"\n    Version=\"2.0\"\n    IssueInstant=\"");
        xml.push_str(&issue_instant);
        xml.push_str("\"\n    Destination=\"");
        xml.push_str(&xml_escape(acs_url));
        xml.push('"');
        xml.push_str(&in_response_to_attr);
        xml.push_str(">\n    <saml:Issuer>");
        xml.push_str(&xml_escape(&self.issuer));
        xml.push_str("</saml:Issuer>\n");
        xml.push_str("    <samlp:Status>\n        <samlp:StatusCode Value=\"urn:oasis:names:tc:SAML:2.0:status:Success\"/>\n    </samlp:Status>\n");
        xml.push_str(
            "    <saml:Assertion xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\"\n        ID=\"",
        );
        xml.push_str(&xml_escape(assertion_id));
        xml.push_str("\"\n        Version=\"2.0\"\n        IssueInstant=\"");
        xml.push_str(&issue_instant);
        xml.push_str("\">\n        <saml:Issuer>");
        xml.push_str(&xml_escape(&self.issuer));
        xml.push_str("</saml:Issuer>\n        <saml:Subject>\n            <saml:NameID Format=\"");
        xml.push_str(&xml_escape(&profile.name_id_format));
        xml.push_str("\">");
        xml.push_str(&xml_escape(&profile.name_id));
        xml.push_str("</saml:NameID>\n            <saml:SubjectConfirmation Method=\"urn:oasis:names:tc:SAML:2.0:cm:bearer\">\n                <saml:SubjectConfirmationData\n                    NotOnOrAfter=\"");
        xml.push_str(&not_on_or_after);
        xml.push_str("\"\n                    Recipient=\"");
        xml.push_str(&xml_escape(acs_url));
        xml.push('"');
        xml.push_str(&in_response_to_attr);
        xml.push_str("/>\n            </saml:SubjectConfirmation>\n        </saml:Subject>\n");
        xml.push_str("        <saml:Conditions NotBefore=\"");
        xml.push_str(&not_before);
        xml.push_str("\" NotOnOrAfter=\"");
        xml.push_str(&not_on_or_after);
        xml.push_str("\">\n            <saml:AudienceRestriction>\n                <saml:Audience>");
        xml.push_str(&xml_escape(sp_entity_id));
        xml.push_str("</saml:Audience>\n            </saml:AudienceRestriction>\n        </saml:Conditions>\n");
        xml.push_str("        <saml:AuthnStatement AuthnInstant=\"");
        xml.push_str(&issue_instant);
        xml.push_str("\" SessionIndex=\"");
        xml.push_str(&xml_escape(session_index));
        xml.push_str("\">\n            <saml:AuthnContext>\n                <saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport</saml:AuthnContextClassRef>\n            </saml:AuthnContext>\n        </saml:AuthnStatement>\n");
        xml.push_str(&self.build_attributes_xml(profile));
        xml.push_str("\n    </saml:Assertion>\n</samlp:Response>");

        xml
    }

    fn build_attributes_xml(&self, profile: &AssertionProfile) -> String {
        if profile.attributes.is_empty() {
            return String::new();
        }

        let mut attrs = String::from("        <saml:AttributeStatement>\n");
        for attr in &profile.attributes {
            attrs.push_str("            <saml:Attribute Name=\"");
            attrs.push_str(&xml_escape(&attr.name));
            attrs.push_str("\" NameFormat=\"urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified\">\n");
            attrs.push_str("                <saml:AttributeValue xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:type=\"xs:string\">");
            attrs.push_str(&xml_escape(&attr.value));
            attrs.push_str("</saml:AttributeValue>\n");
            attrs.push_str("            </saml:Attribute>\n");
        }
        attrs.push_str("        </saml:AttributeStatement>");
        attrs
    }

    /// Sign the element carrying `element_id` and splice the signature in
    /// right after that element's `Issuer`.
    ///
    /// The digest covers the element as it currently stands (the
    /// signature being created is not yet present, which is exactly the
    /// enveloped transform), so signing the assertion first and the
    /// response second produces a response digest over the
    /// already-signed assertion.
    fn insert_enveloped_signature(
        &self,
        xml: &str,
        element_id: &str,
        element_close_tag: &str,
    ) -> SamlResult<String> {
        let id_pattern = format!("ID=\"{element_id}\"");
        let id_pos = xml.find(&id_pattern).ok_or_else(|| {
            SamlError::AssertionGenerationFailed(format!("Cannot find element {element_id}"))
        })?;
        let element_start = xml[..id_pos].rfind('<').unwrap_or(0);

        let element_end = xml[element_start..]
            .find(element_close_tag)
            .map(|pos| element_start + pos + element_close_tag.len())
            .ok_or_else(|| {
                SamlError::AssertionGenerationFailed(format!(
                    "Cannot find {element_close_tag} end tag"
                ))
            })?;

        let element_content = &xml[element_start..element_end];
        let canonicalized = canonicalize_xml(element_content)?;
        let digest = openssl::hash::hash(
            openssl::hash::MessageDigest::sha256(),
            canonicalized.as_bytes(),
        )
        .map_err(|e| SamlError::AssertionGenerationFailed(format!("Digest failed: {e}")))?;
        let digest_b64 = STANDARD.encode(digest);

        let mut signed_info = String::new();
        signed_info.push_str("<ds:SignedInfo xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">");
        signed_info.push_str(
            "<ds:CanonicalizationMethod Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\"/>",
        );
        signed_info.push_str(
            "<ds:SignatureMethod Algorithm=\"http://www.w3.org/2001/04/xmldsig-more#rsa-sha256\"/>",
        );
        signed_info.push_str("<ds:Reference URI=\"#");
        signed_info.push_str(element_id);
        signed_info.push_str("\"><ds:Transforms>");
        signed_info.push_str(
            "<ds:Transform Algorithm=\"http://www.w3.org/2000/09/xmldsig#enveloped-signature\"/>",
        );
        signed_info.push_str("<ds:Transform Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\"/>");
        signed_info.push_str("</ds:Transforms>");
        signed_info
            .push_str("<ds:DigestMethod Algorithm=\"http://www.w3.org/2001/04/xmlenc#sha256\"/>");
        signed_info.push_str("<ds:DigestValue>");
        signed_info.push_str(&digest_b64);
        signed_info.push_str("</ds:DigestValue></ds:Reference></ds:SignedInfo>");

        let canonicalized_signed_info = canonicalize_xml(&signed_info)?;
        let signature = self
            .credentials
            .sign_sha256(canonicalized_signed_info.as_bytes())?;
        let signature_b64 = STANDARD.encode(&signature);
        let certificate_b64 = self.credentials.certificate_base64_der()?;

        let mut signature_xml = String::new();
        signature_xml
            .push_str("\n        <ds:Signature xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">\n            ");
        signature_xml.push_str(&signed_info);
        signature_xml.push_str("\n            <ds:SignatureValue>");
        signature_xml.push_str(&signature_b64);
        signature_xml.push_str("</ds:SignatureValue>\n            <ds:KeyInfo>\n                <ds:X509Data>\n                    <ds:X509Certificate>");
        signature_xml.push_str(&certificate_b64);
        signature_xml.push_str("</ds:X509Certificate>\n                </ds:X509Data>\n            </ds:KeyInfo>\n        </ds:Signature>");

        let after_issuer = xml[element_start..]
            .find("</saml:Issuer>")
            .map(|pos| element_start + pos + "</saml:Issuer>".len())
            .ok_or_else(|| {
                SamlError::AssertionGenerationFailed("Cannot find Issuer".to_string())
            })?;

        let mut result = String::with_capacity(xml.len() + signature_xml.len());
        result.push_str(&xml[..after_issuer]);
        result.push_str(&signature_xml);
        result.push_str(&xml[after_issuer..]);

        Ok(result)
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Exclusive C14N without comments.
fn canonicalize_xml(xml: &str) -> SamlResult<String> {
    let mut output = Vec::new();
    Canonicalizer::read_from_str(xml)
        .write_to_writer(&mut output)
        .canonicalize(false)
        .map_err(|e| {
            SamlError::AssertionGenerationFailed(format!("XML canonicalization failed: {e}"))
        })?;

    String::from_utf8(output).map_err(|e| {
        SamlError::AssertionGenerationFailed(format!("Canonicalized XML is not valid UTF-8: {e}"))
    })
}

fn xml_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saml::{SamlAttribute, NAMEID_FORMAT_UNSPECIFIED};

    fn test_credentials() -> SigningCredentials {
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

        SigningCredentials::from_pem(
            &String::from_utf8(pkey.private_key_to_pem_pkcs8().unwrap()).unwrap(),
            &String::from_utf8(cert.to_pem().unwrap()).unwrap(),
        )
        .unwrap()
    }

    fn carol_profile() -> AssertionProfile {
        AssertionProfile {
            name_id: "carol@123".to_string(),
            name_id_format: NAMEID_FORMAT_UNSPECIFIED.to_string(),
            attributes: vec![SamlAttribute {
                name: "username".to_string(),
                value: "carol".to_string(),
            }],
        }
    }

    fn build() -> String {
        let builder = ResponseBuilder::new("https://sso.example.com".to_string(), test_credentials());
        let encoded = builder
            .build_signed_response(
                &carol_profile(),
                "https://signin.aliyun.com/x",
                "https://signin.aliyun.com/acs",
                Some("_req42"),
                "5e7f0c4e-8a4b-4a3e-9a52-0f2c0c9a1b2d",
            )
            .unwrap();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn response_carries_name_id_and_audience() {
        let xml = build();
        assert!(xml.contains(">carol@123</saml:NameID>"));
        assert!(xml.contains(&format!("Format=\"{NAMEID_FORMAT_UNSPECIFIED}\"")));
        assert!(xml.contains("<saml:Audience>https://signin.aliyun.com/x</saml:Audience>"));
        assert!(xml.contains("InResponseTo=\"_req42\""));
        assert!(xml.contains("Destination=\"https://signin.aliyun.com/acs\""));
    }

    #[test]
    fn both_response_and_assertion_are_signed() {
        let xml = build();
        assert_eq!(xml.matches("<ds:Signature ").count(), 2);
        assert_eq!(xml.matches("<ds:SignatureValue>").count(), 2);
        assert_eq!(xml.matches("<ds:X509Certificate>").count(), 2);
    }

    #[test]
    fn session_index_is_embedded() {
        let xml = build();
        assert!(xml.contains("SessionIndex=\"5e7f0c4e-8a4b-4a3e-9a52-0f2c0c9a1b2d\""));
    }

    #[test]
    fn attributes_are_rendered() {
        let xml = build();
        assert!(xml.contains("saml:Attribute Name=\"username\""));
        assert!(xml.contains(">carol</saml:AttributeValue>"));
    }

    #[test]
    fn status_is_success() {
        let xml = build();
        assert!(xml.contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    }
}
