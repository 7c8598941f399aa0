//! Profile domain service
//!
//! One gift profile per (user, family) pair: sizes, colors, hobbies,
//! dates — whatever helps the rest of the family shop. Any family member
//! may read any other member's profile.

use sqlx::SqlitePool;

use super::require_member;
use crate::db::models::{Profile, ProfileUpsert};
use crate::db::repository::profile;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
};
use crate::utils::AppResult;

/// Fields counted toward profile completion
const COMPLETION_CHECKLIST_SIZE: u32 = 9;

/// Completion percentage over the fixed checklist {shoe, pant, shirt,
/// ring, colors, vehicle make, hobbies, interests, birthday}, rounded to
/// the nearest percent.
pub fn completion_percentage(profile: &Profile) -> u32 {
    let filled = [
        profile.shoe_size.is_some(),
        profile.pant_size.is_some(),
        profile.shirt_size.is_some(),
        profile.ring_size.is_some(),
        !profile.favorite_colors.is_empty(),
        profile.vehicle_make.is_some(),
        !profile.hobbies.is_empty(),
        !profile.interests.is_empty(),
        profile.birthday.is_some(),
    ]
    .iter()
    .filter(|f| **f)
    .count() as u32;

    (filled * 100 + COMPLETION_CHECKLIST_SIZE / 2) / COMPLETION_CHECKLIST_SIZE
}

/// Profile with its completion score, as returned to clients
#[derive(Debug, serde::Serialize)]
pub struct ProfileResponse {
    pub profile: Option<Profile>,
    pub completion: u32,
}

/// Fetch a member's profile. The viewer must belong to the family; any
/// member may view any other member.
pub async fn get_profile(
    pool: &SqlitePool,
    viewer_id: i64,
    family_id: i64,
    target_user_id: i64,
) -> AppResult<ProfileResponse> {
    require_member(pool, family_id, viewer_id).await?;

    let profile = profile::find(pool, target_user_id, family_id).await?;
    let completion = profile.as_ref().map(completion_percentage).unwrap_or(0);
    Ok(ProfileResponse {
        profile,
        completion,
    })
}

fn validate_upsert(data: &ProfileUpsert) -> AppResult<()> {
    for (value, field) in [
        (&data.shoe_size, "shoeSize"),
        (&data.pant_size, "pantSize"),
        (&data.shirt_size, "shirtSize"),
        (&data.dress_size, "dressSize"),
        (&data.ring_size, "ringSize"),
        (&data.vehicle_make, "vehicleMake"),
        (&data.vehicle_model, "vehicleModel"),
    ] {
        validate_optional_text(value, field, MAX_SHORT_TEXT_LEN)?;
    }
    for (value, field) in [
        (&data.allergies, "allergies"),
        (&data.dietary_restrictions, "dietaryRestrictions"),
        (&data.notes, "notes"),
    ] {
        validate_optional_text(value, field, MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// Create or replace the requester's profile for a family. List fields
/// keep their caller order; dedup is the caller's concern.
pub async fn upsert_profile(
    pool: &SqlitePool,
    user_id: i64,
    data: &ProfileUpsert,
) -> AppResult<ProfileResponse> {
    require_member(pool, data.family_id, user_id).await?;
    validate_upsert(data)?;

    let profile = profile::upsert(pool, user_id, data).await?;
    let completion = completion_percentage(&profile);
    tracing::info!(user_id, family_id = data.family_id, completion, "Profile upserted");
    Ok(ProfileResponse {
        profile: Some(profile),
        completion,
    })
}
