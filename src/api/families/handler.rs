//! Family API handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Family, FamilyWithMembers};
use crate::services::family;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFamilyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinFamilyRequest {
    pub invite_code: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// GET /api/families - families the current user belongs to
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FamilyWithMembers>>> {
    let families = family::list_families(&state.pool, user.id).await?;
    Ok(Json(families))
}

/// POST /api/families - create a family, creator becomes ADMIN
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateFamilyRequest>,
) -> AppResult<(StatusCode, Json<FamilyWithMembers>)> {
    let created = family::create_family(&state.pool, user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/families/{familyId}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(family_id): Path<i64>,
) -> AppResult<Json<FamilyWithMembers>> {
    let found = family::get_family(&state.pool, user.id, family_id).await?;
    Ok(Json(found))
}

/// PATCH /api/families/{familyId} - rename (ADMIN only)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(family_id): Path<i64>,
    Json(payload): Json<UpdateFamilyRequest>,
) -> AppResult<Json<Family>> {
    let updated = family::update_family(&state.pool, user.id, family_id, &payload.name).await?;
    Ok(Json(updated))
}

/// DELETE /api/families/{familyId} - delete with cascade (ADMIN only)
pub async fn delete_family(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(family_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    family::delete_family(&state.pool, user.id, family_id).await?;
    Ok(Json(serde_json::json!({ "message": "Family deleted" })))
}

/// POST /api/families/join - join by invite code
pub async fn join(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<JoinFamilyRequest>,
) -> AppResult<Json<FamilyWithMembers>> {
    let joined = family::join_family(&state.pool, user.id, &payload.invite_code).await?;
    Ok(Json(joined))
}

/// POST /api/families/{familyId}/invite - email an invitation (any member)
pub async fn invite(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(family_id): Path<i64>,
    Json(payload): Json<InviteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    family::invite_by_email(
        &state.pool,
        &state.email,
        user.id,
        user.display_name(),
        family_id,
        &payload.email,
    )
    .await?;
    Ok(Json(serde_json::json!({
        "message": "Invitation sent successfully",
        "email": payload.email,
    })))
}

/// DELETE /api/families/{familyId}/members/{memberId} - ADMIN only,
/// guarded against removing the last admin
pub async fn remove_member(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((family_id, member_id)): Path<(i64, i64)>,
) -> AppResult<Json<serde_json::Value>> {
    let removed = family::remove_member(&state.pool, user.id, family_id, member_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Member removed successfully",
        "removedUserId": removed.user_id,
    })))
}
