//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`. All require auth.
///
/// ```text
/// GET    /                        -> list
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// POST   /{id}/duplicate          -> duplicate
/// GET    /{id}/export/{format}    -> export (html | pdf | docx)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list))
        .route(
            "/{id}",
            get(documents::get_by_id)
                .put(documents::update)
                .delete(documents::delete),
        )
        .route("/{id}/duplicate", post(documents::duplicate))
        .route("/{id}/export/{format}", get(documents::export))
}
