//! HTTP tests for signup, login, refresh, logout, `me` and admin access.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_user, get, get_auth, login, post_auth, post_json,
    put_json_auth, TEST_PASSWORD,
};
use sqlx::PgPool;

fn signup_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "long-enough-pw",
    })
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_creates_user_and_returns_tokens(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/signup",
        signup_body("newcomer"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["username"], "newcomer");
    assert_eq!(json["user"]["role"], "user");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_duplicate_username_is_409(pool: PgPool) {
    create_user(&pool, "taken").await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/signup",
        serde_json::json!({
            "username": "taken",
            "email": "other@example.com",
            "password": "long-enough-pw",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Username is already taken");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_rejects_short_password_and_bad_email(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/signup",
        serde_json::json!({ "username": "shorty", "email": "s@example.com", "password": "1234" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/signup",
        serde_json::json!({ "username": "bademail", "email": "nope", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login / lockout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_is_401(pool: PgPool) {
    create_user(&pool, "alice").await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "alice", "password": "wrong-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_user_is_401(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "ghost", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_locks_after_five_failures(pool: PgPool) {
    create_user(&pool, "bob").await;

    for _ in 0..5 {
        let response = post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/login",
            serde_json::json!({ "username": "bob", "password": "wrong-password" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "bob", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh / logout / me
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/signup",
        signup_body("carol"),
    )
    .await;
    let refresh_token = body_json(response).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"], refresh_token.as_str());

    // The old token was revoked by the rotation.
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_refresh_tokens(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/signup",
        signup_body("dave"),
    )
    .await;
    let json = body_json(response).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_auth(common::build_test_app(pool.clone()), "/api/v1/auth/logout", &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_current_user(pool: PgPool) {
    let user = create_user(&pool, "erin").await;
    let token = login(&pool, "erin").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_route_requires_token(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response =
        get_auth(common::build_test_app(pool), "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_users(pool: PgPool) {
    create_admin(&pool, "root").await;
    create_user(&pool, "frank").await;
    let token = login(&pool, "root").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u["username"] == "root" && u["role"] == "admin"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admin_gets_403_on_admin_routes(pool: PgPool) {
    create_user(&pool, "grace").await;
    let token = login(&pool, "grace").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_deactivation_revokes_refresh_tokens(pool: PgPool) {
    let admin = create_admin(&pool, "root").await;
    let admin_token = login(&pool, "root").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/signup",
        signup_body("henry"),
    )
    .await;
    let json = body_json(response).await;
    let henry_id = json["user"]["id"].as_i64().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{henry_id}"),
        serde_json::json!({ "is_active": false }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "henry", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An admin cannot demote themselves.
    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/admin/users/{}", admin.id),
        serde_json::json!({ "role": "user" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_promotes_user(pool: PgPool) {
    create_admin(&pool, "root").await;
    let ivy = create_user(&pool, "ivy").await;
    let admin_token = login(&pool, "root").await;

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", ivy.id),
        serde_json::json!({ "role": "admin" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    // The new role is in tokens issued from now on.
    let ivy_token = login(&pool, "ivy").await;
    let response =
        get_auth(common::build_test_app(pool.clone()), "/api/v1/admin/users", &ivy_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users/999999",
        serde_json::json!({ "role": "user" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
