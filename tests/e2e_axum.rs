//! End-to-end tests for the axum surface, over the in-memory stores.
//!
//! Run with: `cargo test --test e2e_axum`

#![cfg(all(feature = "axum", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use latchkey::admin::AdminCredentials;
use latchkey::api::{admin_routes, auth_routes, identity_routes, AppState};
use latchkey::jwt::{JwtConfig, JwtService};
use latchkey::session::InMemorySessionRepository;
use latchkey::{
    AuthConfig, InMemoryChallengeRepository, MockIdentityRepository, MockNotifier, SecretString,
};
use tower::ServiceExt;

type State =
    AppState<MockIdentityRepository, InMemoryChallengeRepository, InMemorySessionRepository>;

struct TestApp {
    router: Router,
    notifier: MockNotifier,
}

fn create_app() -> TestApp {
    let notifier = MockNotifier::new();

    let config = AuthConfig {
        session: latchkey::session::SessionConfig {
            secret: SecretString::new("e2e-cookie-secret-that-is-long-enough"),
            ..Default::default()
        },
        ..Default::default()
    };

    let state: State = AppState {
        identities: MockIdentityRepository::new(),
        challenges: InMemoryChallengeRepository::new(),
        sessions: InMemorySessionRepository::new(),
        jwt: JwtService::new(JwtConfig::new("e2e-token-secret-32-bytes-long-key!").unwrap()),
        config,
        notifier: Arc::new(notifier.clone()),
        admin: Some(Arc::new(AdminCredentials::new(
            "admin",
            "operator-password-0123456789",
        ))),
    };

    let router = Router::new()
        .nest(
            "/auth",
            auth_routes::<
                MockIdentityRepository,
                InMemoryChallengeRepository,
                InMemorySessionRepository,
            >(),
        )
        .nest(
            "/users",
            identity_routes::<
                MockIdentityRepository,
                InMemoryChallengeRepository,
                InMemorySessionRepository,
            >(),
        )
        .nest(
            "/admin",
            admin_routes::<
                MockIdentityRepository,
                InMemoryChallengeRepository,
                InMemorySessionRepository,
            >(),
        )
        .with_state(state);

    TestApp { router, notifier }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_then_login() {
    let app = create_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword",
                "full_name": "Alice Example"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["username"], "alice");
    assert!(body.get("hashed_password").is_none());

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "alice", "password": "securepassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(set_cookie.starts_with("latchkey_session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["access_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let app = create_app();

    app.router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();

    let wrong_password = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "alice", "password": "wrongpassword" }),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "mallory", "password": "wrongpassword" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a = body_to_json(wrong_password.into_body()).await;
    let b = body_to_json(unknown_user.into_body()).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn me_works_with_bearer_and_with_cookie() {
    let app = create_app();

    app.router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();

    let login = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "alice", "password": "securepassword" }),
        ))
        .await
        .unwrap();
    let cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();
    let token = body_to_json(login.into_body()).await["access_token"]
        .as_str()
        .unwrap()
        .to_owned();

    // bearer
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["username"], "alice");

    // cookie
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // nothing
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn otp_flow_over_http() {
    let app = create_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/request-otp",
            serde_json::json!({ "phone_number": "555-123-4567" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // the passcode must not appear in the response
    let body = body_to_json(response.into_body()).await;
    tokio::task::yield_now().await;
    let code = app.notifier.last_otp_for("5551234567").unwrap();
    assert!(!serde_json::to_string(&body).unwrap().contains(code.expose()));

    // wrong code → uniform 400
    let wrong = if code.expose() == "000000" { "000001" } else { "000000" };
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/verify-otp",
            serde_json::json!({ "phone_number": "5551234567", "otp": wrong }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // right code → new user, no token yet
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/verify-otp",
            serde_json::json!({ "phone_number": "5551234567", "otp": code.expose() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["is_new_user"], true);
    assert!(body["user"]["username"].is_null());
    assert!(body.get("access_token").is_none());

    // completion returns the first token
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/complete-registration",
            serde_json::json!({
                "phone_number": "5551234567",
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["user"]["phone_verified"], true);
    assert!(body["access_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn admin_login_is_indistinguishable_from_user_login_on_failure() {
    let app = create_app();

    let admin_failure = app
        .router
        .clone()
        .oneshot(post_json(
            "/admin/login",
            serde_json::json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(admin_failure.status(), StatusCode::UNAUTHORIZED);

    let user_failure = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(user_failure.status(), StatusCode::UNAUTHORIZED);

    // identical bodies: the admin surface does not announce itself
    let a = body_to_json(admin_failure.into_body()).await;
    let b = body_to_json(user_failure.into_body()).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn admin_login_success_sets_admin_cookie() {
    let app = create_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/admin/login",
            serde_json::json!({
                "username": "admin",
                "password": "operator-password-0123456789"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("latchkey_admin="));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = create_app();

    app.router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();

    let login = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "username": "alice", "password": "securepassword" }),
        ))
        .await
        .unwrap();
    let cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let logout = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    // the old cookie no longer resolves
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn conflict_names_the_field() {
    let app = create_app();

    app.router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "securepassword"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"], "email already in use");
}
