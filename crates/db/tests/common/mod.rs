//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use docbuilder_core::roles::Role;
use docbuilder_db::models::template::{CreateTemplate, Template};
use docbuilder_db::models::user::{CreateUser, User};
use docbuilder_db::repositories::{TemplateRepo, UserRepo};
use sqlx::PgPool;

pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::User,
        },
    )
    .await
    .unwrap()
}

pub fn new_template(title: &str, content: &str) -> CreateTemplate {
    CreateTemplate {
        title: title.to_string(),
        description: None,
        content: content.to_string(),
        category_id: None,
        is_public: None,
    }
}

pub async fn create_template(pool: &PgPool, owner_id: i64, title: &str, content: &str) -> Template {
    TemplateRepo::create(pool, owner_id, &new_template(title, content))
        .await
        .unwrap()
        .0
}
