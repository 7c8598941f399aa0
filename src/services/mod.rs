//! Domain services
//!
//! Business rules live here, between the HTTP handlers and the
//! repositories. Every operation takes the pool plus the explicit id of
//! the authenticated requester — no ambient session state.

pub mod email;
pub mod family;
pub mod gift_group;
pub mod profile;
pub mod wishlist;

pub use email::EmailService;

use sqlx::SqlitePool;

use crate::db::models::FamilyMember;
use crate::db::repository::family_member;
use crate::utils::{AppError, AppResult};

/// Authorization: the requester must be a member of the family.
pub(crate) async fn require_member(
    pool: &SqlitePool,
    family_id: i64,
    user_id: i64,
) -> AppResult<FamilyMember> {
    family_member::find(pool, family_id, user_id)
        .await?
        .ok_or_else(|| AppError::forbidden("You are not a member of this family"))
}

/// Authorization: the requester must hold the ADMIN role in the family.
pub(crate) async fn require_admin(
    pool: &SqlitePool,
    family_id: i64,
    user_id: i64,
) -> AppResult<FamilyMember> {
    let member = require_member(pool, family_id, user_id).await?;
    if !member.is_admin() {
        return Err(AppError::forbidden(
            "Only family admins can perform this action",
        ));
    }
    Ok(member)
}
