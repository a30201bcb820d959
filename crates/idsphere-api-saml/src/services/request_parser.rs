//! `AuthnRequest` decoding and parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use flate2::read::DeflateDecoder;
use std::io::Read;

use crate::error::{SamlError, SamlResult};

/// Maximum allowed clock skew for `IssueInstant` validation.
const MAX_CLOCK_SKEW_SECS: i64 = 300;

/// Maximum age of an `AuthnRequest` (10 minutes).
const MAX_REQUEST_AGE_SECS: i64 = 600;

/// Maximum decompressed size to bound deflate bombs (64 KB).
const MAX_DECOMPRESSED_SIZE: u64 = 64 * 1024;

/// Maximum encoded `SAMLRequest` size (128 KB).
const MAX_ENCODED_SIZE: usize = 128 * 1024;

/// The fields the IdP needs out of an `AuthnRequest`.
#[derive(Debug, Clone)]
pub struct ParsedAuthnRequest {
    pub id: String,
    /// SP entity id from the `Issuer` element.
    pub issuer: String,
    pub assertion_consumer_service_url: Option<String>,
    pub issue_instant: DateTime<Utc>,
}

/// Parser for `AuthnRequest` messages in either binding.
pub struct RequestParser;

impl RequestParser {
    /// Decode a `SAMLRequest` parameter to XML and parse it.
    ///
    /// The Redirect binding carries base64 over raw DEFLATE; the POST
    /// binding carries plain base64. The deflate path is tried first and
    /// the plain path is the fallback, so one entry point serves both.
    pub fn parse(encoded_request: &str) -> SamlResult<ParsedAuthnRequest> {
        if encoded_request.len() > MAX_ENCODED_SIZE {
            return Err(SamlError::InvalidAuthnRequest(format!(
                "Encoded SAMLRequest exceeds maximum size ({} > {} bytes)",
                encoded_request.len(),
                MAX_ENCODED_SIZE
            )));
        }

        let decoded = STANDARD
            .decode(encoded_request.trim())
            .map_err(|e| SamlError::InvalidAuthnRequest(format!("Base64 decode failed: {e}")))?;

        let xml = match Self::inflate(&decoded) {
            Ok(xml) => xml,
            Err(_) => String::from_utf8(decoded)
                .map_err(|e| SamlError::InvalidAuthnRequest(format!("Invalid UTF-8: {e}")))?,
        };

        Self::parse_xml(&xml)
    }

    /// Decode to XML without parsing, for embedded-signature validation.
    pub fn decode_xml(encoded_request: &str) -> SamlResult<String> {
        let decoded = STANDARD
            .decode(encoded_request.trim())
            .map_err(|e| SamlError::InvalidAuthnRequest(format!("Base64 decode failed: {e}")))?;
        match Self::inflate(&decoded) {
            Ok(xml) => Ok(xml),
            Err(_) => String::from_utf8(decoded)
                .map_err(|e| SamlError::InvalidAuthnRequest(format!("Invalid UTF-8: {e}"))),
        }
    }

    fn inflate(data: &[u8]) -> SamlResult<String> {
        let decoder = DeflateDecoder::new(data);
        let mut xml = String::new();
        decoder
            .take(MAX_DECOMPRESSED_SIZE)
            .read_to_string(&mut xml)
            .map_err(|e| SamlError::InvalidAuthnRequest(format!("Deflate decode failed: {e}")))?;

        if xml.len() as u64 >= MAX_DECOMPRESSED_SIZE {
            return Err(SamlError::InvalidAuthnRequest(
                "Decompressed AuthnRequest exceeds maximum size limit (64 KB)".to_string(),
            ));
        }
        if !xml.contains("AuthnRequest") {
            return Err(SamlError::InvalidAuthnRequest(
                "Inflated payload is not an AuthnRequest".to_string(),
            ));
        }
        Ok(xml)
    }

    /// Parse the `AuthnRequest` XML and validate its `IssueInstant`.
    pub fn parse_xml(xml: &str) -> SamlResult<ParsedAuthnRequest> {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut id = None;
        let mut issuer = None;
        let mut acs_url = None;
        let mut issue_instant_raw = None;
        let mut in_issuer = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e) | Event::Empty(e)) => {
                    let name = e.local_name();
                    let name = std::str::from_utf8(name.as_ref()).unwrap_or("");
                    match name {
                        "AuthnRequest" => {
                            for attr in e.attributes().flatten() {
                                let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
                                let value = attr.unescape_value().unwrap_or_default();
                                match key {
                                    "ID" => id = Some(value.to_string()),
                                    "IssueInstant" => issue_instant_raw = Some(value.to_string()),
                                    "AssertionConsumerServiceURL" => {
                                        acs_url = Some(value.to_string());
                                    }
                                    _ => {}
                                }
                            }
                        }
                        "Issuer" => in_issuer = true,
                        _ => {}
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_issuer {
                        issuer = Some(e.unescape().unwrap_or_default().to_string());
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.local_name();
                    if std::str::from_utf8(name.as_ref()).unwrap_or("") == "Issuer" {
                        in_issuer = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SamlError::InvalidAuthnRequest(format!("XML parse error: {e}")));
                }
                _ => {}
            }
        }

        let id = id
            .ok_or_else(|| SamlError::InvalidAuthnRequest("Missing ID attribute".to_string()))?;
        let issuer = issuer
            .ok_or_else(|| SamlError::InvalidAuthnRequest("Missing Issuer element".to_string()))?;
        let issue_instant_raw = issue_instant_raw.ok_or_else(|| {
            SamlError::InvalidAuthnRequest("Missing IssueInstant attribute".to_string())
        })?;

        let issue_instant = DateTime::parse_from_rfc3339(&issue_instant_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                SamlError::InvalidAuthnRequest(format!("Invalid IssueInstant format: {e}"))
            })?;

        let age_secs = (Utc::now() - issue_instant).num_seconds();
        if age_secs < -MAX_CLOCK_SKEW_SECS {
            return Err(SamlError::InvalidAuthnRequest(format!(
                "IssueInstant is in the future (skew: {}s exceeds {}s tolerance)",
                -age_secs, MAX_CLOCK_SKEW_SECS
            )));
        }
        if age_secs > MAX_REQUEST_AGE_SECS {
            return Err(SamlError::InvalidAuthnRequest(format!(
                "IssueInstant is too old (age: {age_secs}s exceeds {MAX_REQUEST_AGE_SECS}s maximum)"
            )));
        }

        Ok(ParsedAuthnRequest {
            id,
            issuer,
            assertion_consumer_service_url: acs_url,
            issue_instant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn sample_request(issue_instant: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    ID="_req42"
    Version="2.0"
    IssueInstant="{issue_instant}"
    AssertionConsumerServiceURL="https://sp.example.com/saml/acs">
    <saml:Issuer>https://sp.example.com/metadata</saml:Issuer>
</samlp:AuthnRequest>"#
        )
    }

    fn deflate_encode(xml: &str) -> String {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(xml.as_bytes()).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn parses_deflated_redirect_payload() {
        let xml = sample_request(&Utc::now().to_rfc3339());
        let parsed = RequestParser::parse(&deflate_encode(&xml)).unwrap();
        assert_eq!(parsed.id, "_req42");
        assert_eq!(parsed.issuer, "https://sp.example.com/metadata");
        assert_eq!(
            parsed.assertion_consumer_service_url.as_deref(),
            Some("https://sp.example.com/saml/acs")
        );
    }

    #[test]
    fn parses_plain_base64_post_payload() {
        let xml = sample_request(&Utc::now().to_rfc3339());
        let parsed = RequestParser::parse(&STANDARD.encode(&xml)).unwrap();
        assert_eq!(parsed.id, "_req42");
    }

    #[test]
    fn rejects_missing_issue_instant() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_x" Version="2.0">
            <saml:Issuer>https://sp</saml:Issuer></samlp:AuthnRequest>"#;
        let err = RequestParser::parse_xml(xml).unwrap_err();
        assert!(err.to_string().contains("Missing IssueInstant"));
    }

    #[test]
    fn rejects_requests_older_than_ten_minutes() {
        let old = Utc::now() - chrono::Duration::seconds(700);
        let err = RequestParser::parse_xml(&sample_request(&old.to_rfc3339())).unwrap_err();
        assert!(err.to_string().contains("too old"));
    }

    #[test]
    fn accepts_requests_inside_the_window() {
        let recent = Utc::now() - chrono::Duration::seconds(500);
        assert!(RequestParser::parse_xml(&sample_request(&recent.to_rfc3339())).is_ok());
    }

    #[test]
    fn rejects_future_requests_beyond_skew() {
        let future = Utc::now() + chrono::Duration::seconds(600);
        let err = RequestParser::parse_xml(&sample_request(&future.to_rfc3339())).unwrap_err();
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(RequestParser::parse("!!!").is_err());
    }
}
