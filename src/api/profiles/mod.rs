//! Profile API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/profiles",
        get(handler::get_profile).post(handler::upsert),
    )
}
