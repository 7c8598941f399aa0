//! Family API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/families", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/join", post(handler::join))
        .route(
            "/{familyId}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete_family),
        )
        .route("/{familyId}/invite", post(handler::invite))
        .route(
            "/{familyId}/members/{memberId}",
            delete(handler::remove_member),
        )
}
