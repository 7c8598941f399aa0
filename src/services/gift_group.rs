//! Gift group domain service
//!
//! Pooled gifts: a family-scoped group with a target amount, a running
//! contribution total and a small polled chat. The running total is kept
//! equal to the member contribution sum by a transactional delta update
//! in the repository.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::require_member;
use crate::db::models::{
    GiftGroup, GiftGroupCreate, GiftGroupDetail, GiftGroupUpdate, GiftGroupWithCounts,
    MessageWithUser,
};
use crate::db::repository::{family_member, gift_group, message};
use crate::utils::money::{self, MIN_CONTRIBUTION};
use crate::utils::validation::{
    MAX_GROUP_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn validate_group_fields(
    name: Option<&str>,
    description: &Option<String>,
    occasion: &Option<String>,
    target_amount: Option<Decimal>,
) -> AppResult<()> {
    if let Some(n) = name {
        validate_required_text(n, "name", MAX_GROUP_NAME_LEN)?;
    }
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(occasion, "occasion", MAX_SHORT_TEXT_LEN)?;
    if let Some(t) = target_amount {
        money::validate_amount(t, "targetAmount")?;
    }
    Ok(())
}

/// Create a group. The creator joins automatically; every listed member
/// must already belong to the family.
pub async fn create_group(
    pool: &SqlitePool,
    creator_id: i64,
    data: &GiftGroupCreate,
) -> AppResult<GiftGroupDetail> {
    require_member(pool, data.family_id, creator_id).await?;
    validate_group_fields(
        Some(&data.name),
        &data.description,
        &data.occasion,
        data.target_amount,
    )?;

    for user_id in &data.member_ids {
        if family_member::find(pool, data.family_id, *user_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "User {user_id} is not a member of this family"
            )));
        }
    }

    let group = gift_group::create(pool, creator_id, data).await?;
    tracing::info!(group_id = group.id, creator_id, "Gift group created");
    let members = gift_group::list_members(pool, group.id).await?;
    Ok(GiftGroupDetail { group, members })
}

/// Groups in the family the requester belongs to, with chat counters.
pub async fn list_groups(
    pool: &SqlitePool,
    requester_id: i64,
    family_id: i64,
) -> AppResult<Vec<GiftGroupWithCounts>> {
    require_member(pool, family_id, requester_id).await?;

    let groups = gift_group::list_for_user(pool, family_id, requester_id).await?;
    let mut result = Vec::with_capacity(groups.len());
    for group in groups {
        let member = gift_group::find_member(pool, group.id, requester_id).await?;
        let message_count = gift_group::message_count(pool, group.id).await?;
        let unread_count = match &member {
            Some(m) => gift_group::unread_count(pool, group.id, m.last_read_at).await?,
            None => 0,
        };
        result.push(GiftGroupWithCounts {
            group,
            message_count,
            unread_count,
        });
    }
    Ok(result)
}

async fn require_group_member(
    pool: &SqlitePool,
    group_id: i64,
    user_id: i64,
) -> AppResult<(GiftGroup, crate::db::models::GiftGroupMember)> {
    let group = gift_group::find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))?;
    let member = gift_group::find_member(pool, group_id, user_id)
        .await?
        .ok_or_else(|| AppError::forbidden("You are not a member of this group"))?;
    Ok((group, member))
}

pub async fn get_group(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
) -> AppResult<GiftGroupDetail> {
    let (group, _member) = require_group_member(pool, group_id, requester_id).await?;
    let members = gift_group::list_members(pool, group_id).await?;
    Ok(GiftGroupDetail { group, members })
}

/// Update a group — restricted to its creator (group ownership, distinct
/// from the family ADMIN role).
pub async fn update_group(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
    data: &GiftGroupUpdate,
) -> AppResult<GiftGroup> {
    let group = gift_group::find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))?;
    if group.created_by != requester_id {
        return Err(AppError::forbidden("Only the creator can update this group"));
    }
    validate_group_fields(
        data.name.as_deref(),
        &data.description,
        &data.occasion,
        data.target_amount,
    )?;
    Ok(gift_group::update(pool, group_id, data).await?)
}

/// Delete a group — creator only.
pub async fn delete_group(pool: &SqlitePool, requester_id: i64, group_id: i64) -> AppResult<()> {
    let group = gift_group::find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))?;
    if group.created_by != requester_id {
        return Err(AppError::forbidden("Only the creator can delete this group"));
    }
    gift_group::delete(pool, group_id).await?;
    tracing::info!(group_id, requester_id, "Gift group deleted");
    Ok(())
}

/// Set the requester's contribution. The member row and the group's
/// running total move together in one transaction; the total always
/// equals the member sum.
pub async fn contribute(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
    amount: Decimal,
    has_paid: bool,
) -> AppResult<GiftGroup> {
    let (_group, member) = require_group_member(pool, group_id, requester_id).await?;

    money::validate_amount(amount, "amount")?;
    if amount < MIN_CONTRIBUTION {
        return Err(AppError::validation("Contribution must be at least $0.01"));
    }

    let group = gift_group::contribute(pool, group_id, member.id, amount, has_paid).await?;
    tracing::info!(
        group_id,
        user_id = requester_id,
        amount = %amount,
        total = %group.current_amount,
        "Contribution updated"
    );
    Ok(group)
}

/// Append a chat message (group members only, non-empty after trim).
pub async fn post_message(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
    content: &str,
) -> AppResult<MessageWithUser> {
    let (_group, _member) = require_group_member(pool, group_id, requester_id).await?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message content is required"));
    }
    if trimmed.len() > MAX_NOTE_LEN {
        return Err(AppError::validation(format!(
            "Message is too long ({} chars, max {MAX_NOTE_LEN})",
            trimmed.len()
        )));
    }

    Ok(message::create(pool, group_id, requester_id, trimmed).await?)
}

/// Full chat history, creation time ascending. Safe to poll.
pub async fn list_messages(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
) -> AppResult<Vec<MessageWithUser>> {
    let (_group, _member) = require_group_member(pool, group_id, requester_id).await?;
    Ok(message::list_for_group(pool, group_id).await?)
}

/// Move the requester's read mark to now; unread counts restart from
/// here.
pub async fn mark_messages_read(
    pool: &SqlitePool,
    requester_id: i64,
    group_id: i64,
) -> AppResult<()> {
    let (_group, member) = require_group_member(pool, group_id, requester_id).await?;
    gift_group::touch_last_read(pool, member.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::User;
    use crate::db::repository::user as user_repo;
    use crate::db::test_pool;
    use crate::services::family::{create_family, join_family};
    use std::str::FromStr;

    async fn seed_user(pool: &SqlitePool, email: &str, name: &str) -> User {
        user_repo::create(pool, email, Some(name), "argon2-hash-placeholder")
            .await
            .expect("seed user")
    }

    async fn seed_family(pool: &SqlitePool) -> (User, User, i64) {
        let ana = seed_user(pool, "ana@example.com", "Ana").await;
        let ben = seed_user(pool, "ben@example.com", "Ben").await;
        let family = create_family(pool, ana.id, "Smiths").await.unwrap();
        join_family(pool, ben.id, &family.family.invite_code)
            .await
            .unwrap();
        (ana, ben, family.family.id)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn group_data(family_id: i64, member_ids: Vec<i64>) -> GiftGroupCreate {
        GiftGroupCreate {
            family_id,
            name: "Dad's 60th".to_string(),
            description: None,
            occasion: Some("Birthday".to_string()),
            occasion_date: None,
            target_user_id: None,
            target_amount: Some(dec("100.00")),
            member_ids,
        }
    }

    /// Ledger equality check: current_amount == Σ contributions
    async fn assert_ledger_consistent(pool: &SqlitePool, group_id: i64) {
        let group = gift_group::find_by_id(pool, group_id)
            .await
            .unwrap()
            .unwrap();
        let members = gift_group::list_members(pool, group_id).await.unwrap();
        let sum: Decimal = members
            .iter()
            .filter_map(|m| m.contribution_amount)
            .sum();
        assert_eq!(group.current_amount, sum, "ledger out of balance");
    }

    #[tokio::test]
    async fn contribution_ledger_scenario() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;

        let detail = create_group(&pool, ana.id, &group_data(family_id, vec![ben.id]))
            .await
            .unwrap();
        let group_id = detail.group.id;
        assert_eq!(detail.group.current_amount, Decimal::ZERO);
        assert_eq!(detail.members.len(), 2);
        assert!(detail.members.iter().all(|m| m.contribution_amount.is_none()));

        // M1 contributes 30.00
        let g = contribute(&pool, ana.id, group_id, dec("30.00"), false)
            .await
            .unwrap();
        assert_eq!(g.current_amount, dec("30.00"));
        assert_ledger_consistent(&pool, group_id).await;

        // M1 raises to 50.00 (delta +20.00)
        let g = contribute(&pool, ana.id, group_id, dec("50.00"), true)
            .await
            .unwrap();
        assert_eq!(g.current_amount, dec("50.00"));
        assert_ledger_consistent(&pool, group_id).await;

        // M2 contributes 25.00
        let g = contribute(&pool, ben.id, group_id, dec("25.00"), false)
            .await
            .unwrap();
        assert_eq!(g.current_amount, dec("75.00"));
        assert_ledger_consistent(&pool, group_id).await;

        // Lowering a contribution shrinks the total
        let g = contribute(&pool, ben.id, group_id, dec("10.00"), false)
            .await
            .unwrap();
        assert_eq!(g.current_amount, dec("60.00"));
        assert_ledger_consistent(&pool, group_id).await;
    }

    #[tokio::test]
    async fn contribute_requires_group_membership_and_positive_amount() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let cleo = seed_user(&pool, "cleo@example.com", "Cleo").await;

        // Cleo is in the family but not in the group
        let family = crate::db::repository::family::find_by_id(&pool, family_id)
            .await
            .unwrap()
            .unwrap();
        join_family(&pool, cleo.id, &family.invite_code).await.unwrap();

        let detail = create_group(&pool, ana.id, &group_data(family_id, vec![ben.id]))
            .await
            .unwrap();

        assert!(matches!(
            contribute(&pool, cleo.id, detail.group.id, dec("5.00"), false).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            contribute(&pool, ana.id, detail.group.id, dec("0.00"), false).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn group_members_must_belong_to_the_family() {
        let pool = test_pool().await;
        let (ana, _ben, family_id) = seed_family(&pool).await;
        let outsider = seed_user(&pool, "zoe@example.com", "Zoe").await;

        assert!(matches!(
            create_group(&pool, ana.id, &group_data(family_id, vec![outsider.id])).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete_are_creator_only() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let detail = create_group(&pool, ana.id, &group_data(family_id, vec![ben.id]))
            .await
            .unwrap();
        let group_id = detail.group.id;

        let update = GiftGroupUpdate {
            name: Some("Dad's big 60th".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_group(&pool, ben.id, group_id, &update).await,
            Err(AppError::Forbidden(_))
        ));
        let updated = update_group(&pool, ana.id, group_id, &update).await.unwrap();
        assert_eq!(updated.name, "Dad's big 60th");

        assert!(matches!(
            delete_group(&pool, ben.id, group_id).await,
            Err(AppError::Forbidden(_))
        ));
        delete_group(&pool, ana.id, group_id).await.unwrap();
        assert!(matches!(
            get_group(&pool, ana.id, group_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn chat_orders_messages_and_tracks_unread() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let detail = create_group(&pool, ana.id, &group_data(family_id, vec![ben.id]))
            .await
            .unwrap();
        let group_id = detail.group.id;

        post_message(&pool, ana.id, group_id, "  Who wraps it?  ")
            .await
            .unwrap();
        post_message(&pool, ben.id, group_id, "I can").await.unwrap();

        let messages = list_messages(&pool, ben.id, group_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Who wraps it?");
        assert_eq!(messages[1].content, "I can");
        assert!(messages[0].created_at <= messages[1].created_at);

        // Blank messages are rejected
        assert!(matches!(
            post_message(&pool, ana.id, group_id, "   ").await,
            Err(AppError::Validation(_))
        ));

        // Ben has everything unread until he marks the chat read
        let groups = list_groups(&pool, ben.id, family_id).await.unwrap();
        assert_eq!(groups[0].message_count, 2);
        assert_eq!(groups[0].unread_count, 2);

        mark_messages_read(&pool, ben.id, group_id).await.unwrap();
        let groups = list_groups(&pool, ben.id, family_id).await.unwrap();
        assert_eq!(groups[0].unread_count, 0);
    }

    #[tokio::test]
    async fn chat_is_members_only() {
        let pool = test_pool().await;
        let (ana, _ben, family_id) = seed_family(&pool).await;
        let cleo = seed_user(&pool, "cleo@example.com", "Cleo").await;
        let family = crate::db::repository::family::find_by_id(&pool, family_id)
            .await
            .unwrap()
            .unwrap();
        join_family(&pool, cleo.id, &family.invite_code).await.unwrap();

        let detail = create_group(&pool, ana.id, &group_data(family_id, vec![]))
            .await
            .unwrap();

        assert!(matches!(
            list_messages(&pool, cleo.id, detail.group.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            post_message(&pool, cleo.id, detail.group.id, "hi").await,
            Err(AppError::Forbidden(_))
        ));
    }
}
