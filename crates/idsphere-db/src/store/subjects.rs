//! Subject lookups.

use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::Subject;

const SUBJECT_COLUMNS: &str = "id, username, name, email, phone_number, \
     feishu_id, dingtalk_id, wecom_id, ctyun_id";

/// Read-side store for subject records.
#[derive(Debug, Clone)]
pub struct SubjectStore {
    pool: PgPool,
}

impl SubjectStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a subject by numeric id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }

    /// Look up a subject by unique username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }
}
