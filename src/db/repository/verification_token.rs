//! Email verification token repository

use super::RepoResult;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationToken {
    pub identifier: String,
    pub token: String,
    pub expires: i64,
}

impl VerificationToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires <= now
    }
}

pub async fn create(
    pool: &SqlitePool,
    identifier: &str,
    token: &str,
    expires: i64,
) -> RepoResult<()> {
    sqlx::query("INSERT INTO verification_token (identifier, token, expires) VALUES (?1, ?2, ?3)")
        .bind(identifier)
        .bind(token)
        .bind(expires)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_token(
    pool: &SqlitePool,
    token: &str,
) -> RepoResult<Option<VerificationToken>> {
    let row = sqlx::query_as::<_, VerificationToken>(
        "SELECT identifier, token, expires FROM verification_token WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> RepoResult<()> {
    sqlx::query("DELETE FROM verification_token WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop all tokens for an email (used before issuing a replacement)
pub async fn delete_for_identifier(pool: &SqlitePool, identifier: &str) -> RepoResult<()> {
    sqlx::query("DELETE FROM verification_token WHERE identifier = ?")
        .bind(identifier)
        .execute(pool)
        .await?;
    Ok(())
}
