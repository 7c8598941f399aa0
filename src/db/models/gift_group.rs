//! Gift group models
//!
//! A gift group pools contributions toward a shared present. The group's
//! `current_amount` is a running total kept equal to the sum of member
//! contributions; the repository updates both inside one transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::str::FromStr;

/// Gift group entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroup {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub occasion: Option<String>,
    /// ISO-8601 date
    pub occasion_date: Option<String>,
    /// The gift's recipient; usually excluded from membership
    pub target_user_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub target_amount: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_amount: Decimal,
    pub is_active: bool,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode_decimal_opt(row: &SqliteRow, column: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let text: Option<String> = row.try_get(column)?;
    text.map(|t| {
        Decimal::from_str(&t).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

impl sqlx::FromRow<'_, SqliteRow> for GiftGroup {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            family_id: row.try_get("family_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            occasion: row.try_get("occasion")?,
            occasion_date: row.try_get("occasion_date")?,
            target_user_id: row.try_get("target_user_id")?,
            target_amount: decode_decimal_opt(row, "target_amount")?,
            current_amount: decode_decimal(row, "current_amount")?,
            is_active: row.try_get("is_active")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Group membership row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupMember {
    pub id: i64,
    pub gift_group_id: i64,
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub contribution_amount: Option<Decimal>,
    pub has_paid: bool,
    pub last_read_at: Option<i64>,
    pub joined_at: i64,
}

impl sqlx::FromRow<'_, SqliteRow> for GiftGroupMember {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            gift_group_id: row.try_get("gift_group_id")?,
            user_id: row.try_get("user_id")?,
            contribution_amount: decode_decimal_opt(row, "contribution_amount")?,
            has_paid: row.try_get("has_paid")?,
            last_read_at: row.try_get("last_read_at")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}

/// Membership row joined with the member's user summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupMemberWithUser {
    pub id: i64,
    pub gift_group_id: i64,
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub contribution_amount: Option<Decimal>,
    pub has_paid: bool,
    pub last_read_at: Option<i64>,
    pub joined_at: i64,
    pub user_name: Option<String>,
    pub user_email: String,
    pub user_image: Option<String>,
}

impl sqlx::FromRow<'_, SqliteRow> for GiftGroupMemberWithUser {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            gift_group_id: row.try_get("gift_group_id")?,
            user_id: row.try_get("user_id")?,
            contribution_amount: decode_decimal_opt(row, "contribution_amount")?,
            has_paid: row.try_get("has_paid")?,
            last_read_at: row.try_get("last_read_at")?,
            joined_at: row.try_get("joined_at")?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            user_image: row.try_get("user_image")?,
        })
    }
}

/// Create group payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupCreate {
    pub family_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub occasion: Option<String>,
    pub occasion_date: Option<String>,
    pub target_user_id: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub target_amount: Option<Decimal>,
    /// Additional members beyond the creator
    #[serde(default)]
    pub member_ids: Vec<i64>,
}

/// Update group payload (creator only)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub occasion: Option<String>,
    pub occasion_date: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub target_amount: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Group list entry with chat counters for the requesting member
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupWithCounts {
    #[serde(flatten)]
    pub group: GiftGroup,
    pub message_count: i64,
    pub unread_count: i64,
}

/// Group detail: the group plus its member list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftGroupDetail {
    #[serde(flatten)]
    pub group: GiftGroup,
    pub members: Vec<GiftGroupMemberWithUser>,
}
