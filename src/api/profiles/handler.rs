//! Profile API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::ProfileUpsert;
use crate::services::profile::{self, ProfileResponse};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQuery {
    pub family_id: i64,
    /// Defaults to the requester's own profile
    pub user_id: Option<i64>,
}

/// GET /api/profiles?familyId=&userId= - any member may view any member
pub async fn get_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<GetQuery>,
) -> AppResult<Json<ProfileResponse>> {
    let target = query.user_id.unwrap_or(user.id);
    let response = profile::get_profile(&state.pool, user.id, query.family_id, target).await?;
    Ok(Json(response))
}

/// POST /api/profiles - upsert your own profile for a family
pub async fn upsert(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpsert>,
) -> AppResult<Json<ProfileResponse>> {
    let response = profile::upsert_profile(&state.pool, user.id, &payload).await?;
    Ok(Json(response))
}
