//! Server configuration
//!
//! Every setting can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DATABASE_PATH | ./data/secret-shopper.db | SQLite file |
//! | APP_URL | http://localhost:3000 | Base URL used in invite links |
//! | ENVIRONMENT | development | development / staging / production |
//! | RESEND_API_KEY | (unset) | Outbound email; logs links when unset |
//! | RESEND_FROM_EMAIL | onboarding@resend.dev | Invite sender address |
//! | LOG_DIR | (unset) | Daily-rolling log file directory |

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Base URL for links embedded in emails
    pub app_url: String,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Resend API key; None disables real delivery
    pub resend_api_key: Option<String>,
    /// Sender address for outbound email
    pub email_from: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/secret-shopper.db".into()),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            resend_api_key: std::env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty()),
            email_from: std::env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
