//! Wishlist domain service
//!
//! Claim visibility rule: the owner of an item must never observe who
//! claimed it or whether it was purchased. The canonical claim state is
//! stored as-is; [`project_for_viewer`] blanks it per response.

use sqlx::SqlitePool;
use std::collections::HashMap;

use super::require_member;
use crate::db::models::{
    Priority, UserSummary, WishlistItem, WishlistItemCreate, WishlistItemUpdate, WishlistItemView,
};
use crate::db::repository::{user, wishlist};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, validate_optional_text, validate_optional_url,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, money};

/// Blank claim fields on items the viewer owns. Pure view mapping, no
/// storage involved.
pub fn project_for_viewer(mut item: WishlistItem, viewer_id: i64) -> WishlistItem {
    if item.user_id == viewer_id {
        item.claimed_by = None;
        item.claimed_at = None;
        item.purchased = false;
    }
    item
}

fn attach_users(
    item: WishlistItem,
    users: &HashMap<i64, UserSummary>,
) -> WishlistItemView {
    let owner = users.get(&item.user_id).cloned();
    let claimer = item.claimed_by.and_then(|id| users.get(&id).cloned());
    WishlistItemView {
        owner,
        claimer,
        item,
    }
}

fn validate_item_fields(
    title: Option<&str>,
    description: &Option<String>,
    url: &Option<String>,
    image_url: &Option<String>,
    price: Option<rust_decimal::Decimal>,
    category: &Option<String>,
) -> AppResult<()> {
    if let Some(t) = title {
        validate_required_text(t, "title", MAX_TITLE_LEN)?;
    }
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_url(url, "url")?;
    validate_optional_url(image_url, "imageUrl")?;
    if let Some(p) = price {
        money::validate_amount(p, "price")?;
    }
    validate_optional_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// Items in a family, priority HIGH→LOW then newest first, with the
/// owner-blind projection applied for the viewer.
pub async fn list_items(
    pool: &SqlitePool,
    viewer_id: i64,
    family_id: i64,
    owner_id: Option<i64>,
    priority: Option<Priority>,
) -> AppResult<Vec<WishlistItemView>> {
    require_member(pool, family_id, viewer_id).await?;

    let items = wishlist::list(pool, family_id, owner_id, priority).await?;
    let users: HashMap<i64, UserSummary> = user::summaries_for_family(pool, family_id)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(items
        .into_iter()
        .map(|item| project_for_viewer(item, viewer_id))
        .map(|item| attach_users(item, &users))
        .collect())
}

pub async fn create_item(
    pool: &SqlitePool,
    owner_id: i64,
    data: &WishlistItemCreate,
) -> AppResult<WishlistItem> {
    require_member(pool, data.family_id, owner_id).await?;
    validate_item_fields(
        Some(&data.title),
        &data.description,
        &data.url,
        &data.image_url,
        data.price,
        &data.category,
    )?;

    let item = wishlist::create(pool, owner_id, data).await?;
    tracing::info!(item_id = item.id, owner_id, "Wishlist item created");
    Ok(item)
}

/// Only the owner may edit an item.
pub async fn update_item(
    pool: &SqlitePool,
    requester_id: i64,
    item_id: i64,
    data: &WishlistItemUpdate,
) -> AppResult<WishlistItem> {
    let item = wishlist::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;
    if item.user_id != requester_id {
        return Err(AppError::forbidden("You can only edit your own items"));
    }
    validate_item_fields(
        data.title.as_deref(),
        &data.description,
        &data.url,
        &data.image_url,
        data.price,
        &data.category,
    )?;

    let updated = wishlist::update(pool, item_id, data).await?;
    Ok(project_for_viewer(updated, requester_id))
}

/// Only the owner may delete an item.
pub async fn delete_item(pool: &SqlitePool, requester_id: i64, item_id: i64) -> AppResult<()> {
    let item = wishlist::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;
    if item.user_id != requester_id {
        return Err(AppError::forbidden("You can only delete your own items"));
    }
    wishlist::delete(pool, item_id).await?;
    Ok(())
}

/// Claim an item for anonymous gifting. Owners cannot claim their own
/// items; an item claimed by someone else stays claimed. Re-claiming by
/// the same user is a no-op.
pub async fn claim(pool: &SqlitePool, requester_id: i64, item_id: i64) -> AppResult<WishlistItem> {
    let item = wishlist::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;
    require_member(pool, item.family_id, requester_id).await?;

    if item.user_id == requester_id {
        return Err(AppError::conflict(
            "You cannot claim your own wishlist items",
        ));
    }

    match item.claimed_by {
        Some(claimer) if claimer != requester_id => Err(AppError::conflict(
            "This item has already been claimed by someone else",
        )),
        Some(_) => Ok(item), // already ours, nothing to do
        None => {
            let claimed = wishlist::claim(pool, item_id, requester_id).await?;
            tracing::info!(item_id, claimer_id = requester_id, "Wishlist item claimed");
            Ok(claimed)
        }
    }
}

/// Release a claim. Clears the purchase mark with it so the two fields
/// never diverge.
pub async fn unclaim(pool: &SqlitePool, requester_id: i64, item_id: i64) -> AppResult<WishlistItem> {
    let item = wishlist::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;

    if item.claimed_by != Some(requester_id) {
        return Err(AppError::forbidden(
            "You can only unclaim items you have claimed",
        ));
    }

    Ok(wishlist::unclaim(pool, item_id).await?)
}

/// Mark a claimed item purchased. Claimer only; an unclaimed item cannot
/// be purchased.
pub async fn mark_purchased(
    pool: &SqlitePool,
    requester_id: i64,
    item_id: i64,
) -> AppResult<WishlistItem> {
    let item = wishlist::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;

    if item.claimed_by != Some(requester_id) {
        return Err(AppError::forbidden(
            "Only the person who claimed this item can mark it as purchased",
        ));
    }

    Ok(wishlist::mark_purchased(pool, item_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::User;
    use crate::db::repository::user as user_repo;
    use crate::db::test_pool;
    use crate::services::family::{create_family, join_family};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn seed_user(pool: &SqlitePool, email: &str, name: &str) -> User {
        user_repo::create(pool, email, Some(name), "argon2-hash-placeholder")
            .await
            .expect("seed user")
    }

    /// Two users sharing a family, returns (owner, other, family_id)
    async fn seed_family(pool: &SqlitePool) -> (User, User, i64) {
        let ana = seed_user(pool, "ana@example.com", "Ana").await;
        let ben = seed_user(pool, "ben@example.com", "Ben").await;
        let family = create_family(pool, ana.id, "Smiths").await.unwrap();
        join_family(pool, ben.id, &family.family.invite_code)
            .await
            .unwrap();
        (ana, ben, family.family.id)
    }

    fn bike(family_id: i64) -> WishlistItemCreate {
        WishlistItemCreate {
            family_id,
            title: "Bike".to_string(),
            description: None,
            url: None,
            image_url: None,
            price: Some(Decimal::from_str("120.00").unwrap()),
            priority: None,
            category: None,
        }
    }

    #[test]
    fn projection_blanks_claim_fields_for_owner_only() {
        let item = WishlistItem {
            id: 1,
            user_id: 10,
            family_id: 1,
            title: "Bike".into(),
            description: None,
            url: None,
            image_url: None,
            price: None,
            priority: Priority::Medium,
            category: None,
            claimed_by: Some(20),
            claimed_at: Some(1000),
            purchased: true,
            created_at: 0,
            updated_at: 0,
        };

        let owner_view = project_for_viewer(item.clone(), 10);
        assert_eq!(owner_view.claimed_by, None);
        assert_eq!(owner_view.claimed_at, None);
        assert!(!owner_view.purchased);

        let other_view = project_for_viewer(item, 20);
        assert_eq!(other_view.claimed_by, Some(20));
        assert!(other_view.purchased);
    }

    #[tokio::test]
    async fn claim_purchase_unclaim_scenario() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;

        let item = create_item(&pool, ana.id, &bike(family_id)).await.unwrap();
        assert_eq!(item.priority, Priority::Medium);

        // Ben claims Ana's bike
        let claimed = claim(&pool, ben.id, item.id).await.unwrap();
        assert_eq!(claimed.claimed_by, Some(ben.id));

        // Ana's view shows no claim info
        let ana_items = list_items(&pool, ana.id, family_id, None, None)
            .await
            .unwrap();
        let ana_bike = &ana_items[0].item;
        assert_eq!(ana_bike.claimed_by, None);
        assert!(!ana_bike.purchased);
        assert!(ana_items[0].claimer.is_none());

        // Ben's view shows the claim
        let ben_items = list_items(&pool, ben.id, family_id, None, None)
            .await
            .unwrap();
        assert_eq!(ben_items[0].item.claimed_by, Some(ben.id));

        // Ben purchases, then unclaims; purchase mark clears with the claim
        let purchased = mark_purchased(&pool, ben.id, item.id).await.unwrap();
        assert!(purchased.purchased);
        let released = unclaim(&pool, ben.id, item.id).await.unwrap();
        assert_eq!(released.claimed_by, None);
        assert!(!released.purchased);
    }

    #[tokio::test]
    async fn claim_conflict_matrix() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let cleo = seed_user(&pool, "cleo@example.com", "Cleo").await;
        let family = crate::db::repository::family::find_by_id(&pool, family_id)
            .await
            .unwrap()
            .unwrap();
        join_family(&pool, cleo.id, &family.invite_code).await.unwrap();

        let item = create_item(&pool, ana.id, &bike(family_id)).await.unwrap();

        // Owner cannot claim their own item
        assert!(matches!(
            claim(&pool, ana.id, item.id).await,
            Err(AppError::Conflict(_))
        ));

        // Ben claims; Cleo cannot take it over
        claim(&pool, ben.id, item.id).await.unwrap();
        assert!(matches!(
            claim(&pool, cleo.id, item.id).await,
            Err(AppError::Conflict(_))
        ));

        // Re-claim by Ben is a no-op
        let again = claim(&pool, ben.id, item.id).await.unwrap();
        assert_eq!(again.claimed_by, Some(ben.id));

        // Only the claimer can unclaim or purchase
        assert!(matches!(
            unclaim(&pool, cleo.id, item.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            mark_purchased(&pool, cleo.id, item.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn purchase_requires_a_claim() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let item = create_item(&pool, ana.id, &bike(family_id)).await.unwrap();

        assert!(matches!(
            mark_purchased(&pool, ben.id, item.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn only_owner_edits_and_deletes() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;
        let item = create_item(&pool, ana.id, &bike(family_id)).await.unwrap();

        let update = WishlistItemUpdate {
            title: Some("Road bike".to_string()),
            description: None,
            url: None,
            image_url: None,
            price: None,
            priority: Some(Priority::High),
            category: None,
        };
        assert!(matches!(
            update_item(&pool, ben.id, item.id, &update).await,
            Err(AppError::Forbidden(_))
        ));
        let updated = update_item(&pool, ana.id, item.id, &update).await.unwrap();
        assert_eq!(updated.title, "Road bike");
        assert_eq!(updated.priority, Priority::High);

        assert!(matches!(
            delete_item(&pool, ben.id, item.id).await,
            Err(AppError::Forbidden(_))
        ));
        delete_item(&pool, ana.id, item.id).await.unwrap();
        assert!(matches!(
            claim(&pool, ben.id, item.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_orders_by_priority_then_recency_and_filters() {
        let pool = test_pool().await;
        let (ana, ben, family_id) = seed_family(&pool).await;

        for (title, priority) in [
            ("Socks", Priority::Low),
            ("Bike", Priority::High),
            ("Book", Priority::Medium),
        ] {
            let mut data = bike(family_id);
            data.title = title.to_string();
            data.priority = Some(priority);
            create_item(&pool, ana.id, &data).await.unwrap();
        }

        let items = list_items(&pool, ben.id, family_id, None, None)
            .await
            .unwrap();
        let titles: Vec<&str> = items.iter().map(|v| v.item.title.as_str()).collect();
        assert_eq!(titles, vec!["Bike", "Book", "Socks"]);

        let high_only = list_items(&pool, ben.id, family_id, None, Some(Priority::High))
            .await
            .unwrap();
        assert_eq!(high_only.len(), 1);
        assert_eq!(high_only[0].item.title, "Bike");

        let ana_only = list_items(&pool, ben.id, family_id, Some(ana.id), None)
            .await
            .unwrap();
        assert_eq!(ana_only.len(), 3);
    }

    #[tokio::test]
    async fn validation_rejects_bad_input() {
        let pool = test_pool().await;
        let (ana, _ben, family_id) = seed_family(&pool).await;

        let mut no_title = bike(family_id);
        no_title.title = "  ".to_string();
        assert!(matches!(
            create_item(&pool, ana.id, &no_title).await,
            Err(AppError::Validation(_))
        ));

        let mut negative = bike(family_id);
        negative.price = Some(Decimal::from_str("-1").unwrap());
        assert!(matches!(
            create_item(&pool, ana.id, &negative).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_url = bike(family_id);
        bad_url.url = Some("notaurl".to_string());
        assert!(matches!(
            create_item(&pool, ana.id, &bad_url).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn non_members_cannot_list_or_create() {
        let pool = test_pool().await;
        let (_ana, _ben, family_id) = seed_family(&pool).await;
        let dora = seed_user(&pool, "dora@example.com", "Dora").await;

        assert!(matches!(
            list_items(&pool, dora.id, family_id, None, None).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            create_item(&pool, dora.id, &bike(family_id)).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
