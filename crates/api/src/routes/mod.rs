pub mod admin;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/signup, /auth/login, /auth/refresh      public
/// /auth/logout, /auth/me                        auth
///
/// /dashboard                                    public, user stats when authed
///
/// /templates                                    list, create
/// /templates/import                             import JSON export
/// /templates/bulk                               bulk actions
/// /templates/{id}                               get, update, delete
/// /templates/{id}/preview                       sample render
/// /templates/{id}/duplicate                     copy
/// /templates/{id}/export                        JSON download
/// /templates/{id}/fields                        list, create
/// /templates/{id}/fields/detect                 reconcile with content
/// /templates/{id}/fields/{field_id}             update, delete
/// /templates/{id}/documents                     create document
///
/// /documents                                    list (+ stats)
/// /documents/{id}                               get, update, delete
/// /documents/{id}/duplicate                     copy
/// /documents/{id}/export/{format}               html | pdf | docx
///
/// /categories                                   list, create
/// /categories/{id}                              get, update, delete
///
/// /admin/users                                  list (admin)
/// /admin/users/{id}                             role / active flag (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/dashboard", dashboard::router())
        .nest("/templates", templates::router())
        .nest("/documents", documents::router())
        .nest("/categories", categories::router())
        .nest("/admin", admin::router())
}
