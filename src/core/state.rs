//! Shared server state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::EmailService;

/// Server state — shared handles for every request handler
///
/// Cloning is shallow (pool and services are reference counted).
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | immutable settings |
/// | pool | SqlitePool | database access |
/// | jwt_service | Arc<JwtService> | session tokens |
/// | email | EmailService | outbound invitations |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub email: EmailService,
}

impl ServerState {
    /// Initialize state: open the database (running migrations) and build
    /// the JWT and email services.
    pub async fn initialize(config: &Config) -> Self {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).expect("Failed to create database directory");
        }

        let db = DbService::new(&config.database_path)
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let email = EmailService::new(config);

        Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service,
            email,
        }
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
