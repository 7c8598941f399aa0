//! Auth API module
//!
//! Register, login, verify and resend-verification are public; me and
//! logout require a session.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/verify", get(handler::verify))
        .route("/resend-verification", post(handler::resend_verification))
        .route("/me", get(handler::me))
        .route("/logout", post(handler::logout))
}
