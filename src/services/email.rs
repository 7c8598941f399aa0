//! Outbound email
//!
//! Thin wrapper over the Resend HTTP API. Stateless relative to the
//! database; callers supply everything that goes into the message.
//! Without an API key (development) the service logs the link instead of
//! sending, and reports success.

use serde::Serialize;

use crate::core::Config;
use crate::utils::{AppError, AppResult};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone, Debug)]
pub struct EmailService {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    app_url: String,
}

impl EmailService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
            app_url: config.app_url.clone(),
        }
    }

    /// Send the family invitation carrying the invite code and a register
    /// link. Delivery failure surfaces as an internal error; the caller
    /// decides whether that fails the request.
    pub async fn send_family_invite(
        &self,
        to: &str,
        family_name: &str,
        invite_code: &str,
        inviter_name: &str,
    ) -> AppResult<()> {
        let invite_link = format!("{}/register?inviteCode={}", self.app_url, invite_code);
        let subject = format!("{inviter_name} invited you to join {family_name} on Secret Shopper");
        let html = invite_html(family_name, invite_code, inviter_name, &invite_link, to);
        self.send(to, &subject, &html, &invite_link).await
    }

    /// Send the address-verification email issued at registration.
    pub async fn send_verification(&self, to: &str, token: &str) -> AppResult<()> {
        let verify_link = format!("{}/api/auth/verify?token={}", self.app_url, token);
        let subject = "Verify your Secret Shopper account".to_string();
        let html = format!(
            "<p>Welcome to Secret Shopper!</p>\
             <p>Confirm your email address by opening the link below within 24 hours:</p>\
             <p><a href=\"{verify_link}\">{verify_link}</a></p>\
             <p>If you didn't create an account, you can safely ignore this email.</p>"
        );
        self.send(to, &subject, &html, &verify_link).await
    }

    async fn send(&self, to: &str, subject: &str, html: &str, link: &str) -> AppResult<()> {
        let Some(api_key) = &self.api_key else {
            tracing::info!(to = %to, link = %link, "Email delivery disabled, logging link instead");
            return Ok(());
        };

        let body = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Email request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, detail = %detail, "Email provider rejected message");
            return Err(AppError::internal("Failed to send email"));
        }

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

fn invite_html(
    family_name: &str,
    invite_code: &str,
    inviter_name: &str,
    invite_link: &str,
    to: &str,
) -> String {
    format!(
        "<h1>🎁 Secret Shopper</h1>\
         <h2>You've been invited!</h2>\
         <p><strong>{inviter_name}</strong> has invited you to join the <strong>{family_name}</strong> family on Secret Shopper.</p>\
         <p>Secret Shopper makes it easy to coordinate gift-giving with your family by sharing wishlists, tracking preferences, and organizing group gifts.</p>\
         <p>Your invite code: <code>{invite_code}</code></p>\
         <p><a href=\"{invite_link}\">Join {family_name}</a></p>\
         <p>This invitation was sent to {to}. If you didn't expect it, you can safely ignore this email.</p>"
    )
}
