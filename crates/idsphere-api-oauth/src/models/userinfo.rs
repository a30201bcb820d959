//! Userinfo response model.

use serde::Serialize;

use idsphere_db::models::Subject;

/// Claims returned by the userinfo endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseUserinfo {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub preferred_username: String,
    pub email: String,
    pub phone_number: String,
    pub sub: String,
}

impl From<&Subject> for ResponseUserinfo {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            username: subject.username.clone(),
            preferred_username: subject.username.clone(),
            email: subject.email.clone(),
            phone_number: subject.phone_number.clone(),
            sub: subject.oidc_sub(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_subject_claims() {
        let subject = Subject {
            id: 7,
            username: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: "13800000000".to_string(),
            feishu_id: None,
            dingtalk_id: None,
            wecom_id: None,
            ctyun_id: None,
        };

        let info = ResponseUserinfo::from(&subject);
        assert_eq!(info.sub, "user-7");
        assert_eq!(info.preferred_username, "alice");
        assert_eq!(info.phone_number, "13800000000");
    }
}
