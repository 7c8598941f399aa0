//! Gift group chat message model
//!
//! Append-only; ordering is creation time ascending. The chat is polled
//! by clients, so list queries must stay cheap and repeatable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub gift_group_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: i64,
}

/// Message joined with the author's user summary
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithUser {
    pub id: i64,
    pub gift_group_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: i64,
    pub user_name: Option<String>,
    pub user_email: String,
    pub user_image: Option<String>,
}
