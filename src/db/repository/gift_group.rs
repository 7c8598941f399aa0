//! Gift group repository
//!
//! The contribution ledger lives here: `contribute` applies the member's
//! new amount and the signed delta to the group total inside a single
//! transaction, so `current_amount` always equals the member sum.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;

use super::{RepoError, RepoResult};
use crate::db::models::{
    GiftGroup, GiftGroupCreate, GiftGroupMember, GiftGroupMemberWithUser, GiftGroupUpdate,
};
use crate::utils::id::{now_millis, snowflake_id};
use crate::utils::money;

const GROUP_SELECT: &str = "SELECT id, family_id, name, description, occasion, occasion_date, target_user_id, target_amount, current_amount, is_active, created_by, created_at, updated_at FROM gift_group";

const MEMBER_SELECT: &str = "SELECT id, gift_group_id, user_id, contribution_amount, has_paid, last_read_at, joined_at FROM gift_group_member";

const MEMBER_WITH_USER_SELECT: &str = "SELECT gm.id, gm.gift_group_id, gm.user_id, gm.contribution_amount, gm.has_paid, gm.last_read_at, gm.joined_at, u.name as user_name, u.email as user_email, u.image as user_image FROM gift_group_member gm JOIN user u ON gm.user_id = u.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<GiftGroup>> {
    let sql = format!("{GROUP_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, GiftGroup>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Groups in the family that the user belongs to, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    family_id: i64,
    user_id: i64,
) -> RepoResult<Vec<GiftGroup>> {
    let sql = format!(
        "{GROUP_SELECT} WHERE family_id = ?1 AND id IN (SELECT gift_group_id FROM gift_group_member WHERE user_id = ?2) ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, GiftGroup>(&sql)
        .bind(family_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_member(
    pool: &SqlitePool,
    group_id: i64,
    user_id: i64,
) -> RepoResult<Option<GiftGroupMember>> {
    let sql = format!("{MEMBER_SELECT} WHERE gift_group_id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, GiftGroupMember>(&sql)
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_members(
    pool: &SqlitePool,
    group_id: i64,
) -> RepoResult<Vec<GiftGroupMemberWithUser>> {
    let sql = format!("{MEMBER_WITH_USER_SELECT} WHERE gm.gift_group_id = ? ORDER BY gm.joined_at");
    let rows = sqlx::query_as::<_, GiftGroupMemberWithUser>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Create the group plus its member rows (creator first) in one transaction
pub async fn create(
    pool: &SqlitePool,
    creator_id: i64,
    data: &GiftGroupCreate,
) -> RepoResult<GiftGroup> {
    let now = now_millis();
    let group_id = snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO gift_group (id, family_id, name, description, occasion, occasion_date, target_user_id, target_amount, current_amount, is_active, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '0.00', 1, ?9, ?10, ?10)",
    )
    .bind(group_id)
    .bind(data.family_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.occasion)
    .bind(&data.occasion_date)
    .bind(data.target_user_id)
    .bind(data.target_amount.map(money::to_stored))
    .bind(creator_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let mut member_ids: Vec<i64> = vec![creator_id];
    for id in &data.member_ids {
        if !member_ids.contains(id) {
            member_ids.push(*id);
        }
    }
    for user_id in member_ids {
        sqlx::query(
            "INSERT INTO gift_group_member (id, gift_group_id, user_id, contribution_amount, has_paid, joined_at) VALUES (?1, ?2, ?3, NULL, 0, ?4)",
        )
        .bind(snowflake_id())
        .bind(group_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create gift group".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &GiftGroupUpdate) -> RepoResult<GiftGroup> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE gift_group SET name = COALESCE(?1, name), description = COALESCE(?2, description), occasion = COALESCE(?3, occasion), occasion_date = COALESCE(?4, occasion_date), target_amount = COALESCE(?5, target_amount), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.occasion)
    .bind(&data.occasion_date)
    .bind(data.target_amount.map(money::to_stored))
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Gift group {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Gift group {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM gift_group WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Set a member's contribution and apply the signed delta to the group
/// total atomically. Both writes commit or neither does; a partial write
/// would break the ledger equality.
pub async fn contribute(
    pool: &SqlitePool,
    group_id: i64,
    member_id: i64,
    amount: Decimal,
    has_paid: bool,
) -> RepoResult<GiftGroup> {
    let now = now_millis();

    let mut tx = pool.begin().await?;

    // Read previous contribution and group total inside the transaction
    let previous: Option<String> =
        sqlx::query_scalar("SELECT contribution_amount FROM gift_group_member WHERE id = ?")
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await?;
    let previous = previous
        .as_deref()
        .map(Decimal::from_str)
        .transpose()
        .map_err(|e| RepoError::Database(format!("Bad contribution amount: {e}")))?
        .unwrap_or(Decimal::ZERO);

    let current: String = sqlx::query_scalar("SELECT current_amount FROM gift_group WHERE id = ?")
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;
    let current = Decimal::from_str(&current)
        .map_err(|e| RepoError::Database(format!("Bad group amount: {e}")))?;

    let delta = amount - previous;

    sqlx::query(
        "UPDATE gift_group_member SET contribution_amount = ?1, has_paid = ?2 WHERE id = ?3",
    )
    .bind(money::to_stored(amount))
    .bind(has_paid)
    .bind(member_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE gift_group SET current_amount = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(money::to_stored(current + delta))
        .bind(now)
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Gift group {group_id} not found")))
}

pub async fn message_count(pool: &SqlitePool, group_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM message WHERE gift_group_id = ?")
        .bind(group_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Messages created after the member's last read mark (all when unread)
pub async fn unread_count(
    pool: &SqlitePool,
    group_id: i64,
    last_read_at: Option<i64>,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM message WHERE gift_group_id = ?1 AND created_at > COALESCE(?2, 0)",
    )
    .bind(group_id)
    .bind(last_read_at)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn touch_last_read(pool: &SqlitePool, member_id: i64) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE gift_group_member SET last_read_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(member_id)
        .execute(pool)
        .await?;
    Ok(())
}
