//! `cas:serviceResponse` rendering.
//!
//! The namespace URI and the element layout are fixed by the clients the
//! platform federates with; attribute children inside `cas:attributes`
//! carry no prefix.

use idsphere_db::models::Subject;

/// The Yale CAS namespace.
const CAS_XMLNS: &str = "http://www.yale.edu/tp/cas";

/// Render an `authenticationSuccess` response for a validated subject.
#[must_use]
pub fn success_response(subject: &Subject) -> String {
    let mut xml = String::new();
    xml.push_str("<cas:serviceResponse xmlns:cas=\"");
    xml.push_str(CAS_XMLNS);
    xml.push_str("\">\n    <cas:authenticationSuccess>\n        <cas:user>");
    xml.push_str(&xml_escape(&subject.username));
    xml.push_str("</cas:user>\n        <cas:attributes>\n            <id>");
    xml.push_str(&subject.id.to_string());
    xml.push_str("</id>\n            <name>");
    xml.push_str(&xml_escape(&subject.name));
    xml.push_str("</name>\n            <username>");
    xml.push_str(&xml_escape(&subject.username));
    xml.push_str("</username>\n            <email>");
    xml.push_str(&xml_escape(&subject.email));
    xml.push_str("</email>\n            <phone_number>");
    xml.push_str(&xml_escape(&subject.phone_number));
    xml.push_str(
        "</phone_number>\n        </cas:attributes>\n    </cas:authenticationSuccess>\n</cas:serviceResponse>",
    );
    xml
}

/// Render an `authenticationFailure` response.
#[must_use]
pub fn failure_response(code: &str, message: &str) -> String {
    format!(
        "<cas:serviceResponse xmlns:cas=\"{CAS_XMLNS}\">\n    \
         <cas:authenticationFailure code=\"{}\">{}</cas:authenticationFailure>\n\
         </cas:serviceResponse>",
        xml_escape(code),
        xml_escape(message)
    )
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

    fn bob() -> Subject {
        Subject {
            id: 2,
            username: "bob".to_string(),
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            phone_number: "13900000000".to_string(),
            feishu_id: None,
            dingtalk_id: None,
            wecom_id: None,
            ctyun_id: None,
        }
    }

    #[test]
    fn success_carries_user_and_attributes() {
        let xml = success_response(&bob());
        assert!(xml.contains("xmlns:cas=\"http://www.yale.edu/tp/cas\""));
        assert!(xml.contains("<cas:user>bob</cas:user>"));
        assert!(xml.contains("<id>2</id>"));
        assert!(xml.contains("<email>bob@example.com</email>"));
        assert!(xml.contains("<phone_number>13900000000</phone_number>"));
    }

    #[test]
    fn failure_carries_code_and_message() {
        let xml = failure_response("INVALID_TICKET", "ticket string is invalid");
        assert!(xml.contains("code=\"INVALID_TICKET\""));
        assert!(xml.contains(">ticket string is invalid</cas:authenticationFailure>"));
    }

    #[test]
    fn user_content_is_escaped() {
        let mut subject = bob();
        subject.name = "Bob <admin>".to_string();
        let xml = success_response(&subject);
        assert!(xml.contains("<name>Bob &lt;admin&gt;</name>"));
    }
}
