//! Family membership repository

use super::{RepoError, RepoResult};
use crate::db::models::{FamilyMember, FamilyMemberWithUser, FamilyRole};
use crate::utils::id::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const MEMBER_SELECT: &str =
    "SELECT id, family_id, user_id, role, joined_at FROM family_member";

const MEMBER_WITH_USER_SELECT: &str = "SELECT fm.id, fm.family_id, fm.user_id, fm.role, fm.joined_at, u.name as user_name, u.email as user_email, u.image as user_image FROM family_member fm JOIN user u ON fm.user_id = u.id";

/// Membership row for (family, user), the core authorization lookup
pub async fn find(
    pool: &SqlitePool,
    family_id: i64,
    user_id: i64,
) -> RepoResult<Option<FamilyMember>> {
    let sql = format!("{MEMBER_SELECT} WHERE family_id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, FamilyMember>(&sql)
        .bind(family_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<FamilyMember>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, FamilyMember>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_for_family(
    pool: &SqlitePool,
    family_id: i64,
) -> RepoResult<Vec<FamilyMemberWithUser>> {
    let sql = format!("{MEMBER_WITH_USER_SELECT} WHERE fm.family_id = ? ORDER BY fm.joined_at");
    let rows = sqlx::query_as::<_, FamilyMemberWithUser>(&sql)
        .bind(family_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_admins(pool: &SqlitePool, family_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM family_member WHERE family_id = ? AND role = 'ADMIN'",
    )
    .bind(family_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn insert(
    pool: &SqlitePool,
    family_id: i64,
    user_id: i64,
    role: FamilyRole,
) -> RepoResult<FamilyMember> {
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO family_member (id, family_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(family_id)
    .bind(user_id)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to insert family member".into()))
}

/// Remove a member and everything they hold in this family: their profile
/// and their gift-group memberships. Group running totals shrink by the
/// member's contributions so the ledger stays equal to the member sum.
/// One transaction.
pub async fn remove_with_cascade(pool: &SqlitePool, member: &FamilyMember) -> RepoResult<()> {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    let now = now_millis();
    let mut tx = pool.begin().await?;

    // Contributions the member leaves behind, per group
    let contributions: Vec<(i64, Option<String>, String)> = sqlx::query_as(
        "SELECT g.id, gm.contribution_amount, g.current_amount FROM gift_group_member gm JOIN gift_group g ON gm.gift_group_id = g.id WHERE gm.user_id = ?1 AND g.family_id = ?2",
    )
    .bind(member.user_id)
    .bind(member.family_id)
    .fetch_all(&mut *tx)
    .await?;

    for (group_id, contribution, current) in contributions {
        let contribution = contribution
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|e| RepoError::Database(format!("Bad contribution amount: {e}")))?
            .unwrap_or(Decimal::ZERO);
        if contribution.is_zero() {
            continue;
        }
        let current = Decimal::from_str(&current)
            .map_err(|e| RepoError::Database(format!("Bad group amount: {e}")))?;
        sqlx::query("UPDATE gift_group SET current_amount = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(crate::utils::money::to_stored(current - contribution))
            .bind(now)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        "DELETE FROM gift_group_member WHERE user_id = ?1 AND gift_group_id IN (SELECT id FROM gift_group WHERE family_id = ?2)",
    )
    .bind(member.user_id)
    .bind(member.family_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM profile WHERE user_id = ?1 AND family_id = ?2")
        .bind(member.user_id)
        .bind(member.family_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM family_member WHERE id = ?")
        .bind(member.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
