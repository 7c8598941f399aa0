//! Wishlist item repository
//!
//! Stores the canonical claim state. Owner-blind projection happens in the
//! wishlist service, never here.

use super::{RepoError, RepoResult};
use crate::db::models::{Priority, WishlistItem, WishlistItemCreate, WishlistItemUpdate};
use crate::utils::id::{now_millis, snowflake_id};
use crate::utils::money;
use sqlx::SqlitePool;

const ITEM_SELECT: &str = "SELECT id, user_id, family_id, title, description, url, image_url, price, priority, category, claimed_by, claimed_at, purchased, created_at, updated_at FROM wishlist_item";

/// Priority sorts HIGH first; ties break on newest creation time
const PRIORITY_ORDER: &str =
    "CASE priority WHEN 'HIGH' THEN 3 WHEN 'MEDIUM' THEN 2 ELSE 1 END DESC, created_at DESC";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<WishlistItem>> {
    let sql = format!("{ITEM_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, WishlistItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list(
    pool: &SqlitePool,
    family_id: i64,
    owner_id: Option<i64>,
    priority: Option<Priority>,
) -> RepoResult<Vec<WishlistItem>> {
    let mut sql = format!("{ITEM_SELECT} WHERE family_id = ?1");
    if owner_id.is_some() {
        sql.push_str(" AND user_id = ?2");
    }
    if priority.is_some() {
        sql.push_str(" AND priority = ?3");
    }
    sql.push_str(&format!(" ORDER BY {PRIORITY_ORDER}"));

    let rows = sqlx::query_as::<_, WishlistItem>(&sql)
        .bind(family_id)
        .bind(owner_id)
        .bind(priority.map(|p| p.as_str()))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    data: &WishlistItemCreate,
) -> RepoResult<WishlistItem> {
    let now = now_millis();
    let id = snowflake_id();
    let priority = data.priority.unwrap_or(Priority::Medium);

    sqlx::query(
        "INSERT INTO wishlist_item (id, user_id, family_id, title, description, url, image_url, price, priority, category, purchased, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?11)",
    )
    .bind(id)
    .bind(owner_id)
    .bind(data.family_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.url)
    .bind(&data.image_url)
    .bind(data.price.map(money::to_stored))
    .bind(priority.as_str())
    .bind(&data.category)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create wishlist item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &WishlistItemUpdate,
) -> RepoResult<WishlistItem> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE wishlist_item SET title = COALESCE(?1, title), description = COALESCE(?2, description), url = COALESCE(?3, url), image_url = COALESCE(?4, image_url), price = COALESCE(?5, price), priority = COALESCE(?6, priority), category = COALESCE(?7, category), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.url)
    .bind(&data.image_url)
    .bind(data.price.map(money::to_stored))
    .bind(data.priority.map(|p| p.as_str()))
    .bind(&data.category)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Wishlist item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Wishlist item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM wishlist_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn claim(pool: &SqlitePool, id: i64, claimer_id: i64) -> RepoResult<WishlistItem> {
    let now = now_millis();
    sqlx::query(
        "UPDATE wishlist_item SET claimed_by = ?1, claimed_at = ?2, updated_at = ?2 WHERE id = ?3",
    )
    .bind(claimer_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Wishlist item {id} not found")))
}

/// Clearing a claim also clears purchased — the two never diverge
pub async fn unclaim(pool: &SqlitePool, id: i64) -> RepoResult<WishlistItem> {
    let now = now_millis();
    sqlx::query(
        "UPDATE wishlist_item SET claimed_by = NULL, claimed_at = NULL, purchased = 0, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Wishlist item {id} not found")))
}

pub async fn mark_purchased(pool: &SqlitePool, id: i64) -> RepoResult<WishlistItem> {
    let now = now_millis();
    sqlx::query("UPDATE wishlist_item SET purchased = 1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Wishlist item {id} not found")))
}
