//! User repository

use super::RepoResult;
use crate::db::models::{User, UserSummary};
use crate::utils::id::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, email, name, password_hash, image, email_verified, created_at, updated_at FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    email: &str,
    name: Option<&str>,
    password_hash: &str,
) -> RepoResult<User> {
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, email, name, password_hash, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create user".into()))
}

pub async fn mark_email_verified(pool: &SqlitePool, user_id: i64) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE user SET email_verified = ?1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// User summaries for all members of a family, keyed lookup for view mapping
pub async fn summaries_for_family(
    pool: &SqlitePool,
    family_id: i64,
) -> RepoResult<Vec<UserSummary>> {
    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.name, u.email, u.image FROM user u JOIN family_member fm ON fm.user_id = u.id WHERE fm.family_id = ?",
    )
    .bind(family_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
