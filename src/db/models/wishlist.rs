//! Wishlist item model
//!
//! Claim fields (`claimed_by`, `claimed_at`, `purchased`) are stored
//! canonically and blanked per-viewer by the wishlist service projection:
//! the owner of an item must never observe them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::str::FromStr;

use super::UserSummary;

/// Wishlist item priority, ordered LOW < MEDIUM < HIGH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Wishlist item as stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: i64,
    pub user_id: i64,
    pub family_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub priority: Priority,
    pub category: Option<String>,
    pub claimed_by: Option<i64>,
    pub claimed_at: Option<i64>,
    pub purchased: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let text: Option<String> = row.try_get(column)?;
    text.map(|t| {
        Decimal::from_str(&t).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

impl sqlx::FromRow<'_, SqliteRow> for WishlistItem {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let priority_text: String = row.try_get("priority")?;
        let priority =
            Priority::parse(&priority_text).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "priority".to_string(),
                source: format!("unknown priority {priority_text}").into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            family_id: row.try_get("family_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            url: row.try_get("url")?,
            image_url: row.try_get("image_url")?,
            price: decode_decimal(row, "price")?,
            priority,
            category: row.try_get("category")?,
            claimed_by: row.try_get("claimed_by")?,
            claimed_at: row.try_get("claimed_at")?,
            purchased: row.try_get("purchased")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Create item payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemCreate {
    pub family_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

/// Update item payload (owner only)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

/// Per-viewer projection of an item, with owner/claimer summaries attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemView {
    #[serde(flatten)]
    pub item: WishlistItem,
    pub owner: Option<UserSummary>,
    pub claimer: Option<UserSummary>,
}
