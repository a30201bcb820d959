//! SP metadata resolution.
//!
//! When registering a SAML relying party the operator pastes a metadata
//! URL; the platform fetches it and extracts the entity id and signing
//! certificate.

use std::time::Duration;

use crate::error::{SamlError, SamlResult};
use crate::models::SpMetadata;

/// Resolver fetching SP metadata over HTTP.
#[derive(Debug, Clone)]
pub struct SpMetadataResolver {
    http: reqwest::Client,
}

impl SpMetadataResolver {
    /// Create a resolver with a bounded request timeout.
    pub fn new() -> SamlResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SamlError::SpMetadata(format!("HTTP client creation failed: {e}")))?;
        Ok(Self { http })
    }

    /// Fetch and parse a metadata document.
    pub async fn resolve(&self, metadata_url: &str) -> SamlResult<SpMetadata> {
        let response = self
            .http
            .get(metadata_url)
            .send()
            .await
            .map_err(|e| SamlError::SpMetadata(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SamlError::SpMetadata(format!(
                "HTTP {} from metadata URL",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SamlError::SpMetadata(format!("Body read failed: {e}")))?;

        parse_sp_metadata(&body)
    }
}

/// Extract the entity id and the `signing` certificate from SP metadata.
pub fn parse_sp_metadata(xml: &str) -> SamlResult<SpMetadata> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entity_id = None;
    let mut key_use = None;
    let mut in_certificate = false;
    let mut signing_certificate: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = e.local_name();
                match std::str::from_utf8(name.as_ref()).unwrap_or("") {
                    "EntityDescriptor" => {
                        for attr in e.attributes().flatten() {
                            if std::str::from_utf8(attr.key.as_ref()).unwrap_or("") == "entityID" {
                                entity_id =
                                    Some(attr.unescape_value().unwrap_or_default().to_string());
                            }
                        }
                    }
                    "KeyDescriptor" => {
                        key_use = e.attributes().flatten().find_map(|attr| {
                            (std::str::from_utf8(attr.key.as_ref()).unwrap_or("") == "use")
                                .then(|| attr.unescape_value().unwrap_or_default().to_string())
                        });
                    }
                    "X509Certificate" => in_certificate = true,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_certificate
                    && signing_certificate.is_none()
                    && key_use.as_deref() == Some("signing")
                {
                    signing_certificate = Some(e.unescape().unwrap_or_default().trim().to_string());
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match std::str::from_utf8(name.as_ref()).unwrap_or("") {
                    "X509Certificate" => in_certificate = false,
                    "KeyDescriptor" => key_use = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SamlError::SpMetadata(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    let entity_id = entity_id
        .ok_or_else(|| SamlError::SpMetadata("Missing entityID attribute".to_string()))?;
    let certificate = signing_certificate.ok_or_else(|| {
        // Operators see this string verbatim in the registration UI.
        SamlError::SpMetadata("未找到签名证书".to_string())
    })?;

    Ok(SpMetadata {
        entity_id,
        certificate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SP_METADATA: &str = r#"<?xml version="1.0"?>
<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://sp.example.com/metadata">
    <md:SPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
        <md:KeyDescriptor use="encryption">
            <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                <ds:X509Data><ds:X509Certificate>ENCRYPTIONCERT</ds:X509Certificate></ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>
        <md:KeyDescriptor use="signing">
            <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                <ds:X509Data><ds:X509Certificate>SIGNINGCERT</ds:X509Certificate></ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>
    </md:SPSSODescriptor>
</md:EntityDescriptor>"#;

    #[test]
    fn extracts_entity_id_and_signing_certificate() {
        let metadata = parse_sp_metadata(SP_METADATA).unwrap();
        assert_eq!(metadata.entity_id, "https://sp.example.com/metadata");
        assert_eq!(metadata.certificate, "SIGNINGCERT");
    }

    #[test]
    fn missing_signing_certificate_is_an_error() {
        let xml = SP_METADATA.replace("use=\"signing\"", "use=\"encryption\"");
        let err = parse_sp_metadata(&xml).unwrap_err();
        assert!(err.to_string().contains("未找到签名证书"));
    }

    #[test]
    fn missing_entity_id_is_an_error() {
        let xml = SP_METADATA.replace(" entityID=\"https://sp.example.com/metadata\"", "");
        let err = parse_sp_metadata(&xml).unwrap_err();
        assert!(err.to_string().contains("entityID"));
    }
}
