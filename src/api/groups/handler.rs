//! Gift group API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    GiftGroup, GiftGroupCreate, GiftGroupDetail, GiftGroupUpdate, GiftGroupWithCounts,
    MessageWithUser,
};
use crate::services::gift_group;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub family_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributeRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub has_paid: bool,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

/// GET /api/groups?familyId= - groups you belong to, with chat counters
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<GiftGroupWithCounts>>> {
    let groups = gift_group::list_groups(&state.pool, user.id, query.family_id).await?;
    Ok(Json(groups))
}

/// POST /api/groups - create a group, creator joins automatically
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<GiftGroupCreate>,
) -> AppResult<(StatusCode, Json<GiftGroupDetail>)> {
    let group = gift_group::create_group(&state.pool, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/groups/{groupId} - members only
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> AppResult<Json<GiftGroupDetail>> {
    let group = gift_group::get_group(&state.pool, user.id, group_id).await?;
    Ok(Json(group))
}

/// PATCH /api/groups/{groupId} - creator only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
    Json(payload): Json<GiftGroupUpdate>,
) -> AppResult<Json<GiftGroup>> {
    let group = gift_group::update_group(&state.pool, user.id, group_id, &payload).await?;
    Ok(Json(group))
}

/// DELETE /api/groups/{groupId} - creator only
pub async fn delete_group(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    gift_group::delete_group(&state.pool, user.id, group_id).await?;
    Ok(Json(serde_json::json!({ "message": "Group deleted" })))
}

/// POST /api/groups/{groupId}/contribute - set your contribution; the
/// group total moves by the delta in the same transaction
pub async fn contribute(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
    Json(payload): Json<ContributeRequest>,
) -> AppResult<Json<GiftGroup>> {
    let group = gift_group::contribute(
        &state.pool,
        user.id,
        group_id,
        payload.amount,
        payload.has_paid,
    )
    .await?;
    Ok(Json(group))
}

/// GET /api/groups/{groupId}/messages - full history, oldest first.
/// Clients poll this endpoint; it is cheap and repeatable.
pub async fn list_messages(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Vec<MessageWithUser>>> {
    let messages = gift_group::list_messages(&state.pool, user.id, group_id).await?;
    Ok(Json(messages))
}

/// POST /api/groups/{groupId}/messages
pub async fn post_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
    Json(payload): Json<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<MessageWithUser>)> {
    let message =
        gift_group::post_message(&state.pool, user.id, group_id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/groups/{groupId}/messages/read - move the unread marker
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    gift_group::mark_messages_read(&state.pool, user.id, group_id).await?;
    Ok(Json(serde_json::json!({ "message": "Messages marked read" })))
}
