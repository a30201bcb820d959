//! Auto-submitting POST form for the browser leg to the ACS.

/// Render the HTML page that immediately POSTs `SAMLResponse` (and the
/// round-tripped `RelayState`) to the SP's ACS URL.
#[must_use]
pub fn render_post_form(acs_url: &str, saml_response: &str, relay_state: &str) -> String {
    let relay_input = if relay_state.is_empty() {
        String::new()
    } else {
        format!(
            "\n        <input type=\"hidden\" name=\"RelayState\" value=\"{}\"/>",
            html_escape(relay_state)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>IDSphere SSO</title>
</head>
<body onload="document.forms[0].submit()">
    <noscript>
        <p>JavaScript is disabled. Click the button below to continue.</p>
    </noscript>
    <form method="POST" action="{}">
        <input type="hidden" name="SAMLResponse" value="{}"/>{}
        <noscript>
            <input type="submit" value="Continue"/>
        </noscript>
    </form>
</body>
</html>"#,
        html_escape(acs_url),
        html_escape(saml_response),
        relay_input
    )
}

fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
