//! Wishlist API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/wishlist", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{itemId}",
            axum::routing::patch(handler::update).delete(handler::delete_item),
        )
        .route(
            "/{itemId}/claim",
            post(handler::claim).delete(handler::unclaim),
        )
        .route("/{itemId}/purchase", post(handler::purchase))
}
