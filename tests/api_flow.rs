//! End-to-end API flow over the real router (no network stack).
//!
//! Exercises routing, the auth middleware and the JSON error envelope;
//! domain rules have their own unit tests next to the services.

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode, header};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::Service;

use secret_shopper::auth::{JwtConfig, JwtService};
use secret_shopper::core::{Config, ServerState};
use secret_shopper::services::EmailService;

async fn test_state() -> ServerState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory database options")
        .pragma("foreign_keys", "ON");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");

    let config = Config {
        http_port: 0,
        database_path: ":memory:".to_string(),
        app_url: "http://localhost:3000".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-integration-test".to_string(),
            expiration_minutes: 60,
            issuer: "secret-shopper".to_string(),
            audience: "secret-shopper-web".to_string(),
        },
        environment: "development".to_string(),
        resend_api_key: None,
        email_from: "onboarding@resend.dev".to_string(),
        log_dir: None,
    };

    ServerState {
        pool,
        jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        email: EmailService::new(&config),
        config,
    }
}

fn app(state: &ServerState) -> Router {
    secret_shopper::api::build_app(state).with_state(state.clone())
}

async fn send(app: &mut Router, request: Request<Body>) -> Response<Body> {
    app.call(request).await.expect("infallible service call")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("build request")
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

/// Register + login, returns a bearer token
async fn signup(app: &mut Router, email: &str, name: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": name, "email": email, "password": "correct-horse-battery" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "correct-horse-battery" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().expect("token in response").to_string()
}

#[tokio::test]
async fn health_is_public() {
    let state = test_state().await;
    let mut app = app(&state);

    let response = send(&mut app, get_request("/api/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let state = test_state().await;
    let mut app = app(&state);

    let response = send(&mut app, get_request("/api/families", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].is_string(), "error envelope: {body}");

    let response = send(&mut app, get_request("/api/families", Some("garbage"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let state = test_state().await;
    let mut app = app(&state);

    signup(&mut app, "ana@example.com", "Ana").await;

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "ana@example.com", "password": "correct-horse-battery" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User with this email already exists");
}

#[tokio::test]
async fn wrong_password_gets_the_unified_message() {
    let state = test_state().await;
    let mut app = app(&state);

    signup(&mut app, "ana@example.com", "Ana").await;

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn family_create_join_and_membership_boundary() {
    let state = test_state().await;
    let mut app = app(&state);

    let ana_token = signup(&mut app, "ana@example.com", "Ana").await;
    let ben_token = signup(&mut app, "ben@example.com", "Ben").await;

    // Ana creates a family
    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/families",
            Some(&ana_token),
            json!({ "name": "Smiths" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let family = body_json(response).await;
    let family_id = family["id"].as_i64().expect("family id");
    let invite_code = family["inviteCode"].as_str().expect("invite code").to_string();
    assert_eq!(family["members"].as_array().unwrap().len(), 1);
    assert_eq!(family["members"][0]["role"], "ADMIN");

    // Ben cannot see it before joining
    let response = send(
        &mut app,
        get_request(&format!("/api/families/{family_id}"), Some(&ben_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Ben joins with the code
    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/families/join",
            Some(&ben_token),
            json!({ "inviteCode": invite_code }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let joined = body_json(response).await;
    assert_eq!(joined["members"].as_array().unwrap().len(), 2);

    // Joining twice conflicts
    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/families/join",
            Some(&ben_token),
            json!({ "inviteCode": invite_code }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Ben (MEMBER) cannot rename the family
    let response = send(
        &mut app,
        json_request(
            "PATCH",
            &format!("/api/families/{family_id}"),
            Some(&ben_token),
            json!({ "name": "Ben's now" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wishlist_claim_is_owner_blind_over_http() {
    let state = test_state().await;
    let mut app = app(&state);

    let ana_token = signup(&mut app, "ana@example.com", "Ana").await;
    let ben_token = signup(&mut app, "ben@example.com", "Ben").await;

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/families",
            Some(&ana_token),
            json!({ "name": "Smiths" }),
        ),
    )
    .await;
    let family = body_json(response).await;
    let family_id = family["id"].as_i64().unwrap();
    let invite_code = family["inviteCode"].as_str().unwrap().to_string();
    send(
        &mut app,
        json_request(
            "POST",
            "/api/families/join",
            Some(&ben_token),
            json!({ "inviteCode": invite_code }),
        ),
    )
    .await;

    // Ana adds a bike
    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/wishlist",
            Some(&ana_token),
            json!({ "familyId": family_id, "title": "Bike", "price": 120.0, "priority": "HIGH" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    let item_id = item["id"].as_i64().unwrap();

    // Ben claims it
    let response = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/wishlist/{item_id}/claim"),
            Some(&ben_token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Ana's list shows no claim info
    let response = send(
        &mut app,
        get_request(
            &format!("/api/wishlist?familyId={family_id}"),
            Some(&ana_token),
        ),
    )
    .await;
    let items = body_json(response).await;
    assert_eq!(items[0]["claimedBy"], Value::Null);
    assert_eq!(items[0]["purchased"], false);
    assert_eq!(items[0]["claimer"], Value::Null);

    // Ben's list shows his claim
    let response = send(
        &mut app,
        get_request(
            &format!("/api/wishlist?familyId={family_id}"),
            Some(&ben_token),
        ),
    )
    .await;
    let items = body_json(response).await;
    assert!(items[0]["claimedBy"].is_i64());
    assert_eq!(items[0]["claimer"]["email"], "ben@example.com");

    // Ana cannot claim her own item
    let response = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/wishlist/{item_id}/claim"),
            Some(&ana_token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn contribution_totals_flow_through_the_api() {
    let state = test_state().await;
    let mut app = app(&state);

    let ana_token = signup(&mut app, "ana@example.com", "Ana").await;

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/families",
            Some(&ana_token),
            json!({ "name": "Smiths" }),
        ),
    )
    .await;
    let family = body_json(response).await;
    let family_id = family["id"].as_i64().unwrap();

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/api/groups",
            Some(&ana_token),
            json!({ "familyId": family_id, "name": "Dad's 60th", "targetAmount": 100.0 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = body_json(response).await;
    let group_id = group["id"].as_i64().unwrap();
    assert_eq!(group["currentAmount"].as_f64().unwrap(), 0.0);

    let response = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/groups/{group_id}/contribute"),
            Some(&ana_token),
            json!({ "amount": 30.0 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let group = body_json(response).await;
    assert_eq!(group["currentAmount"].as_f64().unwrap(), 30.0);

    let response = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/groups/{group_id}/contribute"),
            Some(&ana_token),
            json!({ "amount": 50.0, "hasPaid": true }),
        ),
    )
    .await;
    let group = body_json(response).await;
    assert_eq!(group["currentAmount"].as_f64().unwrap(), 50.0);
}
