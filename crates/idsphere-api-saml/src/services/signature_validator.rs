//! `AuthnRequest` signature validation for both bindings.
//!
//! Redirect binding: the signature covers the URL-encoded
//! `SAMLRequest=…&RelayState=…&SigAlg=…` string from the query.
//! POST binding: an enveloped XMLDSig signature inside the request XML.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::sign::Verifier;
use openssl::x509::X509;
use xml_canonicalization::Canonicalizer;

use crate::error::{SamlError, SamlResult};

/// Validator for SP request signatures.
pub struct SignatureValidator;

impl SignatureValidator {
    /// Validate a Redirect-binding signature.
    ///
    /// All inputs except `signature` are the URL-encoded parameter
    /// values; query-string order is part of the signed data.
    pub fn validate_redirect_signature(
        saml_request: &str,
        relay_state: Option<&str>,
        sig_alg: &str,
        signature: &str,
        sp_certificate_pem: &str,
    ) -> SamlResult<()> {
        let cert = parse_certificate(sp_certificate_pem)?;
        let public_key = cert.public_key().map_err(|e| {
            SamlError::SignatureValidationFailed(format!("Invalid certificate: {e}"))
        })?;

        let mut signed_data = format!("SAMLRequest={saml_request}");
        if let Some(rs) = relay_state {
            if !rs.is_empty() {
                signed_data.push_str("&RelayState=");
                signed_data.push_str(rs);
            }
        }
        signed_data.push_str("&SigAlg=");
        signed_data.push_str(sig_alg);

        let signature_bytes = STANDARD.decode(signature).map_err(|e| {
            SamlError::SignatureValidationFailed(format!("Invalid signature encoding: {e}"))
        })?;

        let digest = match urlencoding::decode(sig_alg)
            .map_err(|e| {
                SamlError::SignatureValidationFailed(format!("Invalid SigAlg encoding: {e}"))
            })?
            .as_ref()
        {
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256" => MessageDigest::sha256(),
            "http://www.w3.org/2000/09/xmldsig#rsa-sha1" => MessageDigest::sha1(),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384" => MessageDigest::sha384(),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512" => MessageDigest::sha512(),
            alg => {
                return Err(SamlError::SignatureValidationFailed(format!(
                    "Unsupported signature algorithm: {alg}"
                )));
            }
        };

        verify(&public_key, digest, signed_data.as_bytes(), &signature_bytes)
    }

    /// Validate a POST-binding enveloped signature inside the XML.
    pub fn validate_post_signature(xml: &str, sp_certificate_pem: &str) -> SamlResult<()> {
        let cert = parse_certificate(sp_certificate_pem)?;
        let public_key = cert.public_key().map_err(|e| {
            SamlError::SignatureValidationFailed(format!("Invalid certificate: {e}"))
        })?;

        let sig_info = extract_signature_info(xml)?;
        verify_reference_digest(xml, &sig_info)?;

        let canonicalized_signed_info = canonicalize_xml(&sig_info.signed_info)?;
        let signature_bytes = STANDARD
            .decode(sig_info.signature_value.replace(['\n', '\r', ' '], ""))
            .map_err(|e| {
                SamlError::SignatureValidationFailed(format!("Invalid signature encoding: {e}"))
            })?;

        verify(
            &public_key,
            MessageDigest::sha256(),
            canonicalized_signed_info.as_bytes(),
            &signature_bytes,
        )
    }
}

fn verify(
    public_key: &openssl::pkey::PKey<openssl::pkey::Public>,
    digest: MessageDigest,
    data: &[u8],
    signature: &[u8],
) -> SamlResult<()> {
    let mut verifier = Verifier::new(digest, public_key).map_err(|e| {
        SamlError::SignatureValidationFailed(format!("Verifier creation failed: {e}"))
    })?;
    verifier.update(data).map_err(|e| {
        SamlError::SignatureValidationFailed(format!("Signature update failed: {e}"))
    })?;
    let valid = verifier.verify(signature).map_err(|e| {
        SamlError::SignatureValidationFailed(format!("Signature verification failed: {e}"))
    })?;
    if valid {
        Ok(())
    } else {
        Err(SamlError::SignatureValidationFailed(
            "Signature verification failed: invalid signature".to_string(),
        ))
    }
}

/// Signature pieces extracted from a signed XML document.
#[derive(Debug)]
struct SignatureInfo {
    signed_info: String,
    signature_value: String,
    reference_uri: String,
    digest_value: String,
}

/// Parse the SP certificate, tolerating a bare base64 body.
fn parse_certificate(pem: &str) -> SamlResult<X509> {
    let pem_data = if pem.contains("-----BEGIN CERTIFICATE-----") {
        pem.to_string()
    } else {
        format!(
            "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----",
            pem.trim()
        )
    };

    X509::from_pem(pem_data.as_bytes())
        .map_err(|e| SamlError::SignatureValidationFailed(format!("Invalid certificate: {e}")))
}

/// Exclusive C14N without comments.
fn canonicalize_xml(xml: &str) -> SamlResult<String> {
    let mut output = Vec::new();
    Canonicalizer::read_from_str(xml)
        .write_to_writer(&mut output)
        .canonicalize(false)
        .map_err(|e| {
            SamlError::SignatureValidationFailed(format!("Canonicalization failed: {e}"))
        })?;

    String::from_utf8(output)
        .map_err(|e| SamlError::SignatureValidationFailed(format!("Invalid UTF-8: {e}")))
}

fn extract_signature_info(xml: &str) -> SamlResult<SignatureInfo> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut in_signed_info = false;
    let mut in_signature_value = false;
    let mut in_digest_value = false;
    let mut signed_info = String::new();
    let mut signature_value = String::new();
    let mut digest_value = String::new();
    let mut reference_uri = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                if name == "SignedInfo" || in_signed_info {
                    if name == "SignedInfo" {
                        in_signed_info = true;
                    }
                    let full_tag = std::str::from_utf8(&e).unwrap_or("");
                    signed_info.push('<');
                    signed_info.push_str(full_tag);
                    signed_info.push('>');
                }
                if name == "SignatureValue" {
                    in_signature_value = true;
                } else if name == "DigestValue" {
                    in_digest_value = true;
                } else if name == "Reference" {
                    for attr in e.attributes().flatten() {
                        if std::str::from_utf8(attr.key.as_ref()).unwrap_or("") == "URI" {
                            reference_uri = attr.unescape_value().unwrap_or_default().to_string();
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if in_signed_info {
                    let full_tag = std::str::from_utf8(&e).unwrap_or("");
                    signed_info.push('<');
                    signed_info.push_str(full_tag);
                    signed_info.push_str("/>");
                }
                // Reference elements can be self-closing in SignedInfo
                let local_name = e.local_name();
                if std::str::from_utf8(local_name.as_ref()).unwrap_or("") == "Reference" {
                    for attr in e.attributes().flatten() {
                        if std::str::from_utf8(attr.key.as_ref()).unwrap_or("") == "URI" {
                            reference_uri = attr.unescape_value().unwrap_or_default().to_string();
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");
                if in_signed_info {
                    signed_info.push_str("</");
                    signed_info.push_str(name);
                    signed_info.push('>');
                    if name == "SignedInfo" {
                        in_signed_info = false;
                    }
                } else if name == "SignatureValue" {
                    in_signature_value = false;
                } else if name == "DigestValue" {
                    in_digest_value = false;
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default();
                if in_signed_info {
                    signed_info.push_str(&text);
                } else if in_signature_value {
                    signature_value.push_str(&text);
                } else if in_digest_value {
                    digest_value.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SamlError::SignatureValidationFailed(format!(
                    "XML parse error: {e}"
                )));
            }
            _ => {}
        }
    }

    if signed_info.is_empty() {
        return Err(SamlError::SignatureValidationFailed(
            "No SignedInfo element found".to_string(),
        ));
    }
    if signature_value.is_empty() {
        return Err(SamlError::SignatureValidationFailed(
            "No SignatureValue element found".to_string(),
        ));
    }

    Ok(SignatureInfo {
        signed_info,
        signature_value,
        reference_uri,
        digest_value,
    })
}

/// Recompute the reference digest over the signed element with its
/// signature removed (enveloped transform) and compare.
fn verify_reference_digest(xml: &str, sig_info: &SignatureInfo) -> SamlResult<()> {
    let element_id = sig_info.reference_uri.trim_start_matches('#');

    let content = if element_id.is_empty() {
        xml.to_string()
    } else {
        let id_pattern = format!("ID=\"{element_id}\"");
        let id_pos = xml.find(&id_pattern).ok_or_else(|| {
            SamlError::SignatureValidationFailed(format!(
                "Referenced element not found: {element_id}"
            ))
        })?;
        let open_tag_start = xml[..id_pos].rfind('<').unwrap_or(0);
        let tag_name = extract_tag_name(&xml[open_tag_start..]);
        let close_tag = format!("</{tag_name}");
        let element_end = xml
            .find(&close_tag)
            .map(|pos| pos + close_tag.len() + 1)
            .ok_or_else(|| {
                SamlError::SignatureValidationFailed("Cannot find element end".to_string())
            })?;
        xml[open_tag_start..element_end].to_string()
    };

    let without_signature = remove_signature_element(&content);
    let canonicalized = canonicalize_xml(&without_signature)?;
    let digest = openssl::hash::hash(MessageDigest::sha256(), canonicalized.as_bytes())
        .map_err(|e| SamlError::SignatureValidationFailed(format!("Hash failed: {e}")))?;
    let computed = STANDARD.encode(digest);

    let expected = sig_info.digest_value.replace(['\n', '\r', ' '], "");
    if computed != expected {
        return Err(SamlError::SignatureValidationFailed(
            "Digest mismatch".to_string(),
        ));
    }
    Ok(())
}

fn extract_tag_name(tag_start: &str) -> String {
    tag_start
        .trim_start_matches('<')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches('>')
        .to_string()
}

/// Strip the first `Signature` element (with or without the `ds` prefix).
fn remove_signature_element(xml: &str) -> String {
    for (open, close) in [
        ("<ds:Signature", "</ds:Signature>"),
        ("<Signature", "</Signature>"),
    ] {
        if let (Some(start), Some(end)) = (xml.find(open), xml.find(close)) {
            let mut result = String::with_capacity(xml.len());
            result.push_str(&xml[..start]);
            result.push_str(&xml[end + close.len()..]);
            return result;
        }
    }
    xml.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_base64_certificate_gains_headers() {
        // Not a real certificate; parsing must fail but only after the
        // PEM wrapping path ran.
        let err = parse_certificate("AAAA").unwrap_err();
        assert!(err.to_string().contains("Invalid certificate"));
    }

    #[test]
    fn removes_prefixed_signature_element() {
        let xml = r#"<AuthnRequest ID="x"><ds:Signature>sig</ds:Signature><Issuer>sp</Issuer></AuthnRequest>"#;
        let cleaned = remove_signature_element(xml);
        assert!(!cleaned.contains("Signature"));
        assert!(cleaned.contains("Issuer"));
    }

    #[test]
    fn removes_unprefixed_signature_element() {
        let xml = r#"<AuthnRequest><Signature>sig</Signature><Issuer>sp</Issuer></AuthnRequest>"#;
        let cleaned = remove_signature_element(xml);
        assert!(!cleaned.contains("<Signature"));
    }

    #[test]
    fn extracts_tag_names() {
        assert_eq!(
            extract_tag_name("<samlp:AuthnRequest xmlns=\"x\""),
            "samlp:AuthnRequest"
        );
        assert_eq!(extract_tag_name("<AuthnRequest>"), "AuthnRequest");
    }

    #[test]
    fn unsigned_xml_has_no_signature_info() {
        let err = extract_signature_info("<AuthnRequest ID=\"x\"/>").unwrap_err();
        assert!(err.to_string().contains("No SignedInfo"));
    }

    #[test]
    fn unsupported_sig_alg_is_rejected() {
        // Certificate is irrelevant; the algorithm check needs a parsed
        // certificate first, so feed a structurally valid self-signed one.
        let cert = test_certificate();
        let err = SignatureValidator::validate_redirect_signature(
            "cmVx",
            None,
            "http%3A%2F%2Fexample.com%2Fnot-an-alg",
            "c2ln",
            &cert,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported signature algorithm"));
    }

    fn test_certificate() -> String {
        use openssl::asn1::Asn1Time;
        use openssl::nid::Nid;
        use openssl::pkey::PKey;
        use openssl::rsa::Rsa;
        use openssl::x509::{X509NameBuilder, X509};

        let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, "sp-test").unwrap();
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
            .set_not_after(&Asn1Time::days_from_now(30).unwrap())
            .unwrap();
        builder
            .sign(&pkey, openssl::hash::MessageDigest::sha256())
            .unwrap();
        String::from_utf8(builder.build().to_pem().unwrap()).unwrap()
    }
}
