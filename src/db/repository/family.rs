//! Family repository

use super::{RepoError, RepoResult};
use crate::db::models::Family;
use crate::utils::id::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const FAMILY_SELECT: &str =
    "SELECT id, name, invite_code, created_by, created_at, updated_at FROM family";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Family>> {
    let sql = format!("{FAMILY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Family>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_invite_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Family>> {
    let sql = format!("{FAMILY_SELECT} WHERE invite_code = ?");
    let row = sqlx::query_as::<_, Family>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn invite_code_exists(pool: &SqlitePool, code: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM family WHERE invite_code = ?")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Families the user belongs to, newest first
pub async fn find_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Family>> {
    let sql = format!(
        "{FAMILY_SELECT} WHERE id IN (SELECT family_id FROM family_member WHERE user_id = ?) ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Family>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Create the family and its first ADMIN member in one transaction
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    invite_code: &str,
    owner_id: i64,
) -> RepoResult<Family> {
    let now = now_millis();
    let family_id = snowflake_id();
    let member_id = snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO family (id, name, invite_code, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(family_id)
    .bind(name)
    .bind(invite_code)
    .bind(owner_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO family_member (id, family_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, 'ADMIN', ?4)",
    )
    .bind(member_id)
    .bind(family_id)
    .bind(owner_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, family_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create family".into()))
}

pub async fn update_name(pool: &SqlitePool, id: i64, name: &str) -> RepoResult<Family> {
    let now = now_millis();
    let rows = sqlx::query("UPDATE family SET name = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Family {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Family {id} not found")))
}

/// Delete the family; memberships, profiles, items, groups and messages
/// go with it via ON DELETE CASCADE
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM family WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
