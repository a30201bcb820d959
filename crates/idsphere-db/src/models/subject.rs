//! Subject (user) entity model.

use sqlx::FromRow;

/// Canonical claims of an authenticated subject.
///
/// The provider-specific foreign ids tie the subject to the third-party
/// scan-login accounts and to CTYun's IAM user id used in SAML
/// assertions.
#[derive(Debug, Clone, FromRow)]
pub struct Subject {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub feishu_id: Option<String>,
    pub dingtalk_id: Option<String>,
    pub wecom_id: Option<String>,
    pub ctyun_id: Option<String>,
}

impl Subject {
    /// OIDC `sub` claim for this subject.
    #[must_use]
    pub fn oidc_sub(&self) -> String {
        format!("user-{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oidc_sub_embeds_numeric_id() {
        let subject = Subject {
            id: 7,
            username: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: String::new(),
            feishu_id: None,
            dingtalk_id: None,
            wecom_id: None,
            ctyun_id: None,
        };
        assert_eq!(subject.oidc_sub(), "user-7");
    }
}
