//! Gift group message repository

use super::{RepoError, RepoResult};
use crate::db::models::MessageWithUser;
use crate::utils::id::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const MESSAGE_WITH_USER_SELECT: &str = "SELECT m.id, m.gift_group_id, m.user_id, m.content, m.created_at, u.name as user_name, u.email as user_email, u.image as user_image FROM message m JOIN user u ON m.user_id = u.id";

/// Full history for a group, creation time ascending (total order for
/// the polling chat view)
pub async fn list_for_group(
    pool: &SqlitePool,
    group_id: i64,
) -> RepoResult<Vec<MessageWithUser>> {
    let sql = format!("{MESSAGE_WITH_USER_SELECT} WHERE m.gift_group_id = ? ORDER BY m.created_at, m.id");
    let rows = sqlx::query_as::<_, MessageWithUser>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    group_id: i64,
    author_id: i64,
    content: &str,
) -> RepoResult<MessageWithUser> {
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO message (id, gift_group_id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(group_id)
    .bind(author_id)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await?;

    let sql = format!("{MESSAGE_WITH_USER_SELECT} WHERE m.id = ?");
    sqlx::query_as::<_, MessageWithUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create message".into()))
}
