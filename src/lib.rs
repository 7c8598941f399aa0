//! Secret Shopper - family gift coordination server
//!
//! # Architecture overview
//!
//! - **HTTP API** (`api`): axum routers, one module per resource
//! - **Domain services** (`services`): authorization + business rules
//! - **Database** (`db`): SQLite via sqlx, models and repositories
//! - **Authentication** (`auth`): JWT sessions + argon2 password hashing
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/          # config, state, server lifecycle
//! ├── auth/          # JWT, extractor, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── services/      # family, wishlist, gift group, profile, email
//! ├── db/            # pool, migrations, models, repositories
//! └── utils/         # errors, validation, invite codes, money, ids
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured events on the "security" target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Environment setup: dotenv + logging
pub fn setup_environment() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_dir.as_deref());
    Ok(())
}
