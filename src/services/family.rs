//! Family domain service
//!
//! Families are joined through shareable invite codes. Admins manage the
//! group; every family keeps at least one admin at all times.

use sqlx::SqlitePool;

use super::{require_admin, require_member};
use crate::db::models::{Family, FamilyMember, FamilyRole, FamilyWithMembers};
use crate::db::repository::{family, family_member, user};
use crate::services::EmailService;
use crate::utils::validation::{
    MAX_FAMILY_NAME_LEN, MIN_FAMILY_NAME_LEN, validate_email,
};
use crate::utils::{AppError, AppResult, invite_code};

fn validate_family_name(name: &str) -> AppResult<()> {
    let len = name.trim().len();
    if len < MIN_FAMILY_NAME_LEN || len > MAX_FAMILY_NAME_LEN {
        return Err(AppError::validation(format!(
            "Family name must be between {MIN_FAMILY_NAME_LEN} and {MAX_FAMILY_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Generate an invite code that no existing family uses, regenerating on
/// collision.
async fn generate_unique_invite_code(pool: &SqlitePool) -> AppResult<String> {
    loop {
        let code = invite_code::generate_invite_code();
        if !family::invite_code_exists(pool, &code).await? {
            return Ok(code);
        }
        tracing::debug!(code = %code, "Invite code collision, regenerating");
    }
}

async fn with_members(pool: &SqlitePool, family: Family) -> AppResult<FamilyWithMembers> {
    let members = family_member::list_for_family(pool, family.id).await?;
    Ok(FamilyWithMembers { family, members })
}

/// Create a family; the creator becomes its sole ADMIN member.
pub async fn create_family(
    pool: &SqlitePool,
    owner_id: i64,
    name: &str,
) -> AppResult<FamilyWithMembers> {
    validate_family_name(name)?;

    let code = generate_unique_invite_code(pool).await?;
    let family = family::create(pool, name.trim(), &code, owner_id).await?;
    tracing::info!(family_id = family.id, owner_id, "Family created");
    with_members(pool, family).await
}

/// Families the user belongs to, each with its member list.
pub async fn list_families(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<FamilyWithMembers>> {
    let families = family::find_all_for_user(pool, user_id).await?;
    let mut result = Vec::with_capacity(families.len());
    for f in families {
        result.push(with_members(pool, f).await?);
    }
    Ok(result)
}

pub async fn get_family(
    pool: &SqlitePool,
    requester_id: i64,
    family_id: i64,
) -> AppResult<FamilyWithMembers> {
    let family = family::find_by_id(pool, family_id)
        .await?
        .ok_or_else(|| AppError::not_found("Family not found"))?;
    require_member(pool, family_id, requester_id).await?;
    with_members(pool, family).await
}

/// Rename a family (ADMIN only).
pub async fn update_family(
    pool: &SqlitePool,
    requester_id: i64,
    family_id: i64,
    name: &str,
) -> AppResult<Family> {
    family::find_by_id(pool, family_id)
        .await?
        .ok_or_else(|| AppError::not_found("Family not found"))?;
    require_admin(pool, family_id, requester_id).await?;
    validate_family_name(name)?;
    Ok(family::update_name(pool, family_id, name.trim()).await?)
}

/// Delete a family and everything under it (ADMIN only).
pub async fn delete_family(pool: &SqlitePool, requester_id: i64, family_id: i64) -> AppResult<()> {
    family::find_by_id(pool, family_id)
        .await?
        .ok_or_else(|| AppError::not_found("Family not found"))?;
    require_admin(pool, family_id, requester_id).await?;
    family::delete(pool, family_id).await?;
    tracing::info!(family_id, requester_id, "Family deleted");
    Ok(())
}

/// Join a family by invite code.
pub async fn join_family(
    pool: &SqlitePool,
    user_id: i64,
    code: &str,
) -> AppResult<FamilyWithMembers> {
    if !invite_code::is_valid_invite_code(code) {
        return Err(AppError::validation("Invalid invite code format"));
    }

    let family = family::find_by_invite_code(pool, code)
        .await?
        .ok_or_else(|| AppError::not_found("Invalid invite code"))?;

    if family_member::find(pool, family.id, user_id).await?.is_some() {
        return Err(AppError::conflict(
            "You are already a member of this family",
        ));
    }

    family_member::insert(pool, family.id, user_id, FamilyRole::Member).await?;
    tracing::info!(family_id = family.id, user_id, "User joined family");
    with_members(pool, family).await
}

/// Remove a member (ADMIN only). Rejects self-removal, members of other
/// families, and removing the last admin. Cascades the member's profile
/// and gift-group memberships for this family.
pub async fn remove_member(
    pool: &SqlitePool,
    requester_id: i64,
    family_id: i64,
    member_id: i64,
) -> AppResult<FamilyMember> {
    require_admin(pool, family_id, requester_id).await?;

    let target = family_member::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;

    if target.family_id != family_id {
        return Err(AppError::validation(
            "Member does not belong to this family",
        ));
    }

    if target.user_id == requester_id {
        return Err(AppError::validation(
            "You cannot remove yourself from the family",
        ));
    }

    if target.is_admin() {
        let admins = family_member::count_admins(pool, family_id).await?;
        if admins <= 1 {
            return Err(AppError::conflict(
                "Cannot remove the last admin. Promote another member to admin first.",
            ));
        }
    }

    family_member::remove_with_cascade(pool, &target).await?;
    tracing::info!(
        family_id,
        removed_user_id = target.user_id,
        requester_id,
        "Family member removed"
    );
    Ok(target)
}

/// Email an invitation carrying the family's existing invite code. Any
/// member may invite; people who already belong are rejected.
pub async fn invite_by_email(
    pool: &SqlitePool,
    email_service: &EmailService,
    requester_id: i64,
    requester_name: &str,
    family_id: i64,
    email: &str,
) -> AppResult<()> {
    require_member(pool, family_id, requester_id).await?;

    let family = family::find_by_id(pool, family_id)
        .await?
        .ok_or_else(|| AppError::not_found("Family not found"))?;

    validate_email(email)?;

    if let Some(existing) = user::find_by_email(pool, email).await?
        && family_member::find(pool, family_id, existing.id).await?.is_some()
    {
        return Err(AppError::conflict(
            "This user is already a member of this family",
        ));
    }

    email_service
        .send_family_invite(email, &family.name, &family.invite_code, requester_name)
        .await?;
    tracing::info!(family_id, invited = %email, "Family invitation sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::User;
    use crate::db::repository::user as user_repo;
    use crate::db::test_pool;

    async fn seed_user(pool: &SqlitePool, email: &str, name: &str) -> User {
        user_repo::create(pool, email, Some(name), "argon2-hash-placeholder")
            .await
            .expect("seed user")
    }

    #[tokio::test]
    async fn create_family_makes_creator_sole_admin() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;

        let created = create_family(&pool, ana.id, "Smiths").await.unwrap();
        assert_eq!(created.family.name, "Smiths");
        assert!(invite_code::is_valid_invite_code(&created.family.invite_code));
        assert_eq!(created.members.len(), 1);
        assert_eq!(created.members[0].role, FamilyRole::Admin);
        assert_eq!(created.members[0].user_id, ana.id);
    }

    #[tokio::test]
    async fn family_name_length_is_validated() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;

        assert!(matches!(
            create_family(&pool, ana.id, "S").await,
            Err(AppError::Validation(_))
        ));
        let long = "x".repeat(MAX_FAMILY_NAME_LEN + 1);
        assert!(matches!(
            create_family(&pool, ana.id, &long).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn join_by_code_then_remove_member_then_last_admin_guard() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;
        let ben = seed_user(&pool, "ben@example.com", "Ben").await;

        let created = create_family(&pool, ana.id, "Smiths").await.unwrap();
        let family_id = created.family.id;

        // Ben joins with the code
        let joined = join_family(&pool, ben.id, &created.family.invite_code)
            .await
            .unwrap();
        assert_eq!(joined.members.len(), 2);
        let ben_member = joined
            .members
            .iter()
            .find(|m| m.user_id == ben.id)
            .unwrap();
        assert_eq!(ben_member.role, FamilyRole::Member);
        assert_eq!(
            family_member::count_admins(&pool, family_id).await.unwrap(),
            1
        );

        // Joining twice conflicts
        assert!(matches!(
            join_family(&pool, ben.id, &created.family.invite_code).await,
            Err(AppError::Conflict(_))
        ));

        // Admin removes Ben
        remove_member(&pool, ana.id, family_id, ben_member.id)
            .await
            .unwrap();
        let after = get_family(&pool, ana.id, family_id).await.unwrap();
        assert_eq!(after.members.len(), 1);

        // The remaining admin cannot be removed through this path:
        // self-removal is rejected outright
        let ana_member = after.members[0].id;
        assert!(remove_member(&pool, ana.id, family_id, ana_member).await.is_err());
    }

    #[tokio::test]
    async fn removing_a_non_last_admin_succeeds_and_cascades_profile() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;
        let ben = seed_user(&pool, "ben@example.com", "Ben").await;

        let created = create_family(&pool, ana.id, "Smiths").await.unwrap();
        let family_id = created.family.id;
        join_family(&pool, ben.id, &created.family.invite_code)
            .await
            .unwrap();

        // Promote Ben so the family has two admins
        sqlx::query("UPDATE family_member SET role = 'ADMIN' WHERE family_id = ? AND user_id = ?")
            .bind(family_id)
            .bind(ben.id)
            .execute(&pool)
            .await
            .unwrap();

        // Ben fills in a profile for this family
        let upsert = crate::db::models::ProfileUpsert {
            family_id,
            shoe_size: Some("44".into()),
            ..Default::default()
        };
        crate::db::repository::profile::upsert(&pool, ben.id, &upsert)
            .await
            .unwrap();

        let ben_member = family_member::find(&pool, family_id, ben.id)
            .await
            .unwrap()
            .unwrap();
        remove_member(&pool, ana.id, family_id, ben_member.id)
            .await
            .unwrap();

        // Profile went with the membership
        let profile = crate::db::repository::profile::find(&pool, ben.id, family_id)
            .await
            .unwrap();
        assert!(profile.is_none());
        assert_eq!(
            family_member::count_admins(&pool, family_id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn update_and_delete_require_admin() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;
        let ben = seed_user(&pool, "ben@example.com", "Ben").await;

        let created = create_family(&pool, ana.id, "Smiths").await.unwrap();
        let family_id = created.family.id;
        join_family(&pool, ben.id, &created.family.invite_code)
            .await
            .unwrap();

        assert!(matches!(
            update_family(&pool, ben.id, family_id, "Smith Clan").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete_family(&pool, ben.id, family_id).await,
            Err(AppError::Forbidden(_))
        ));

        let renamed = update_family(&pool, ana.id, family_id, "Smith Clan")
            .await
            .unwrap();
        assert_eq!(renamed.name, "Smith Clan");

        delete_family(&pool, ana.id, family_id).await.unwrap();
        assert!(matches!(
            get_family(&pool, ana.id, family_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn join_with_unknown_or_malformed_code_fails() {
        let pool = test_pool().await;
        let ana = seed_user(&pool, "ana@example.com", "Ana").await;

        assert!(matches!(
            join_family(&pool, ana.id, "AAAA-AAAA").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            join_family(&pool, ana.id, "not-a-code").await,
            Err(AppError::Validation(_))
        ));
    }
}
