//! Wishlist API handlers
//!
//! Every response that carries an item has already been through the
//! owner-blind projection in the service layer.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Priority, WishlistItem, WishlistItemCreate, WishlistItemUpdate, WishlistItemView,
};
use crate::services::wishlist;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub family_id: i64,
    pub user_id: Option<i64>,
    pub priority: Option<String>,
}

/// GET /api/wishlist?familyId=&userId=&priority=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<WishlistItemView>>> {
    let priority = query
        .priority
        .as_deref()
        .map(|p| {
            Priority::parse(p)
                .ok_or_else(|| AppError::validation(format!("Unknown priority: {p}")))
        })
        .transpose()?;

    let items =
        wishlist::list_items(&state.pool, user.id, query.family_id, query.user_id, priority)
            .await?;
    Ok(Json(items))
}

/// POST /api/wishlist - add an item to your own list
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<WishlistItemCreate>,
) -> AppResult<(StatusCode, Json<WishlistItem>)> {
    let item = wishlist::create_item(&state.pool, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/wishlist/{itemId} - owner only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
    Json(payload): Json<WishlistItemUpdate>,
) -> AppResult<Json<WishlistItem>> {
    let item = wishlist::update_item(&state.pool, user.id, item_id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/wishlist/{itemId} - owner only
pub async fn delete_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    wishlist::delete_item(&state.pool, user.id, item_id).await?;
    Ok(Json(serde_json::json!({ "message": "Item deleted" })))
}

/// POST /api/wishlist/{itemId}/claim - reserve someone else's item
pub async fn claim(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<WishlistItem>> {
    let item = wishlist::claim(&state.pool, user.id, item_id).await?;
    Ok(Json(item))
}

/// DELETE /api/wishlist/{itemId}/claim - release your claim
pub async fn unclaim(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<WishlistItem>> {
    let item = wishlist::unclaim(&state.pool, user.id, item_id).await?;
    Ok(Json(item))
}

/// POST /api/wishlist/{itemId}/purchase - claimer marks it bought
pub async fn purchase(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<WishlistItem>> {
    let item = wishlist::mark_purchased(&state.pool, user.id, item_id).await?;
    Ok(Json(item))
}
