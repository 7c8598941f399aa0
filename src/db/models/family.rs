//! Family and membership models

use serde::{Deserialize, Serialize};

/// Family role — every family keeps at least one admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum FamilyRole {
    Admin,
    Member,
}

/// Family entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub invite_code: String,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Membership row (join entity between family and user)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: i64,
    pub family_id: i64,
    pub user_id: i64,
    pub role: FamilyRole,
    pub joined_at: i64,
}

impl FamilyMember {
    pub fn is_admin(&self) -> bool {
        self.role == FamilyRole::Admin
    }
}

/// Membership row joined with the member's user summary (for list views)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberWithUser {
    pub id: i64,
    pub family_id: i64,
    pub user_id: i64,
    pub role: FamilyRole,
    pub joined_at: i64,
    pub user_name: Option<String>,
    pub user_email: String,
    pub user_image: Option<String>,
}

/// Family with its member list (detail/list responses)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyWithMembers {
    #[serde(flatten)]
    pub family: Family,
    pub members: Vec<FamilyMemberWithUser>,
}
