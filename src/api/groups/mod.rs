//! Gift group API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/groups", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{groupId}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete_group),
        )
        .route("/{groupId}/contribute", post(handler::contribute))
        .route(
            "/{groupId}/messages",
            get(handler::list_messages).post(handler::post_message),
        )
        .route("/{groupId}/messages/read", post(handler::mark_read))
}
