//! Gift profile repository

use super::{RepoError, RepoResult};
use crate::db::models::{Profile, ProfileUpsert};
use crate::utils::id::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const PROFILE_SELECT: &str = "SELECT id, user_id, family_id, shoe_size, pant_size, shirt_size, dress_size, ring_size, favorite_colors, vehicle_make, vehicle_model, vehicle_year, hobbies, interests, allergies, dietary_restrictions, notes, birthday, anniversary, created_at, updated_at FROM profile";

pub async fn find(
    pool: &SqlitePool,
    user_id: i64,
    family_id: i64,
) -> RepoResult<Option<Profile>> {
    let sql = format!("{PROFILE_SELECT} WHERE user_id = ? AND family_id = ?");
    let row = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .bind(family_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn encode_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|e| RepoError::Database(format!("Failed to encode list field: {e}")))
}

/// Create or fully replace the (user, family) profile row.
/// The UNIQUE(user_id, family_id) constraint backs the upsert.
pub async fn upsert(pool: &SqlitePool, user_id: i64, data: &ProfileUpsert) -> RepoResult<Profile> {
    let now = now_millis();
    let id = snowflake_id();

    sqlx::query(
        "INSERT INTO profile (id, user_id, family_id, shoe_size, pant_size, shirt_size, dress_size, ring_size, favorite_colors, vehicle_make, vehicle_model, vehicle_year, hobbies, interests, allergies, dietary_restrictions, notes, birthday, anniversary, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20) \
         ON CONFLICT (user_id, family_id) DO UPDATE SET \
         shoe_size = excluded.shoe_size, pant_size = excluded.pant_size, shirt_size = excluded.shirt_size, dress_size = excluded.dress_size, ring_size = excluded.ring_size, \
         favorite_colors = excluded.favorite_colors, vehicle_make = excluded.vehicle_make, vehicle_model = excluded.vehicle_model, vehicle_year = excluded.vehicle_year, \
         hobbies = excluded.hobbies, interests = excluded.interests, allergies = excluded.allergies, dietary_restrictions = excluded.dietary_restrictions, \
         notes = excluded.notes, birthday = excluded.birthday, anniversary = excluded.anniversary, updated_at = excluded.updated_at",
    )
    .bind(id)
    .bind(user_id)
    .bind(data.family_id)
    .bind(&data.shoe_size)
    .bind(&data.pant_size)
    .bind(&data.shirt_size)
    .bind(&data.dress_size)
    .bind(&data.ring_size)
    .bind(encode_list(&data.favorite_colors)?)
    .bind(&data.vehicle_make)
    .bind(&data.vehicle_model)
    .bind(data.vehicle_year)
    .bind(encode_list(&data.hobbies)?)
    .bind(encode_list(&data.interests)?)
    .bind(&data.allergies)
    .bind(&data.dietary_restrictions)
    .bind(&data.notes)
    .bind(&data.birthday)
    .bind(&data.anniversary)
    .bind(now)
    .execute(pool)
    .await?;

    find(pool, user_id, data.family_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert profile".into()))
}
