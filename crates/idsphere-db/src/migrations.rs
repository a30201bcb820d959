//! Embedded schema migrations.

use sqlx::PgPool;

use crate::error::DbResult;

/// Run all pending migrations. Called once at startup.
pub async fn run(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
