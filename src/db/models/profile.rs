//! Gift profile model
//!
//! One row per (user, family) pair. List-valued fields are stored as JSON
//! text arrays and kept in caller order (no dedup at this layer).

use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Per-family gift profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub family_id: i64,
    pub shoe_size: Option<String>,
    pub pant_size: Option<String>,
    pub shirt_size: Option<String>,
    pub dress_size: Option<String>,
    pub ring_size: Option<String>,
    pub favorite_colors: Vec<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i64>,
    pub hobbies: Vec<String>,
    pub interests: Vec<String>,
    pub allergies: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub notes: Option<String>,
    /// ISO-8601 date
    pub birthday: Option<String>,
    /// ISO-8601 date
    pub anniversary: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn decode_string_list(row: &SqliteRow, column: &str) -> Result<Vec<String>, sqlx::Error> {
    let text: String = row.try_get(column)?;
    serde_json::from_str(&text).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl sqlx::FromRow<'_, SqliteRow> for Profile {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            family_id: row.try_get("family_id")?,
            shoe_size: row.try_get("shoe_size")?,
            pant_size: row.try_get("pant_size")?,
            shirt_size: row.try_get("shirt_size")?,
            dress_size: row.try_get("dress_size")?,
            ring_size: row.try_get("ring_size")?,
            favorite_colors: decode_string_list(row, "favorite_colors")?,
            vehicle_make: row.try_get("vehicle_make")?,
            vehicle_model: row.try_get("vehicle_model")?,
            vehicle_year: row.try_get("vehicle_year")?,
            hobbies: decode_string_list(row, "hobbies")?,
            interests: decode_string_list(row, "interests")?,
            allergies: row.try_get("allergies")?,
            dietary_restrictions: row.try_get("dietary_restrictions")?,
            notes: row.try_get("notes")?,
            birthday: row.try_get("birthday")?,
            anniversary: row.try_get("anniversary")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Upsert payload — a full replacement of the profile row
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpsert {
    pub family_id: i64,
    pub shoe_size: Option<String>,
    pub pant_size: Option<String>,
    pub shirt_size: Option<String>,
    pub dress_size: Option<String>,
    pub ring_size: Option<String>,
    #[serde(default)]
    pub favorite_colors: Vec<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i64>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub allergies: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub notes: Option<String>,
    pub birthday: Option<String>,
    pub anniversary: Option<String>,
}
