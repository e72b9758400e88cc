//! HTTP tests for template categories and the dashboard.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_template, delete_auth, get, get_auth, post_json, post_json_auth,
    put_json_auth, signed_in_user,
};
use sqlx::PgPool;

async fn create_category(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/v1/categories", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_crud(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;

    let category = create_category(&pool, &token, serde_json::json!({ "name": "  Contracts " })).await;
    assert_eq!(category["name"], "Contracts");
    assert_eq!(category["color"], "#007bff");
    let uri = format!("/api/v1/categories/{}", category["id"]);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "color": "#AA3300", "description": "Legal documents" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["name"], "Contracts");
    assert_eq!(updated["color"], "#AA3300");
    assert_eq!(updated["description"], "Legal documents");

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_counts_templates(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;
    let letters = create_category(&pool, &token, serde_json::json!({ "name": "Letters" })).await;
    create_category(&pool, &token, serde_json::json!({ "name": "Invoices" })).await;

    create_template(
        &pool,
        &token,
        serde_json::json!({
            "title": "Cover letter",
            "content": "Dear {{nom_client}}, please find attached.",
            "category_id": letters["id"],
        }),
    )
    .await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/categories", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Invoices");
    assert_eq!(data[0]["template_count"], 0);
    assert_eq!(data[1]["name"], "Letters");
    assert_eq!(data[1]["template_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_category_uncategorises_templates(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;
    let category = create_category(&pool, &token, serde_json::json!({ "name": "Temp" })).await;
    let template = create_template(
        &pool,
        &token,
        serde_json::json!({
            "title": "Filed",
            "content": "Hello {{nom_client}}, welcome aboard.",
            "category_id": category["id"],
        }),
    )
    .await;

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/categories/{}", category["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/templates/{}", template["id"]),
        &token,
    )
    .await;
    assert!(body_json(response).await["data"]["category_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_category_name_is_409(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;
    create_category(&pool, &token, serde_json::json!({ "name": "Letters" })).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/categories",
        serde_json::json!({ "name": "Letters" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "A category with this name already exists"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_color_and_blank_name_are_400(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;

    for body in [
        serde_json::json!({ "name": "Colourful", "color": "red" }),
        serde_json::json!({ "name": "Colourful", "color": "#12345G" }),
        serde_json::json!({ "name": "   " }),
    ] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/categories",
            body.clone(),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_categories_require_auth(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/categories").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/categories",
        serde_json::json!({ "name": "Anon" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_anonymous_and_signed_in(pool: PgPool) {
    let (_, token) = signed_in_user(&pool, "curator").await;
    create_template(
        &pool,
        &token,
        serde_json::json!({
            "title": "Shared",
            "content": "Hello {{nom_client}}, welcome aboard.",
            "is_public": true,
        }),
    )
    .await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["site"]["public_templates"], 1);
    assert_eq!(json["data"]["site"]["template_authors"], 1);
    assert!(json["data"]["user"].is_null());

    let response = get_auth(common::build_test_app(pool), "/api/v1/dashboard", &token).await;
    let json = body_json(response).await;
    let user = &json["data"]["user"];
    assert_eq!(user["templates"], 1);
    assert_eq!(user["documents"], 0);
    assert_eq!(user["is_new_user"], true);
    assert_eq!(user["recent_templates"][0]["title"], "Shared");
}
