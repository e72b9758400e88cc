//! Route definitions for `/templates`, including nested fields and
//! document creation.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{documents, template_fields, templates};
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// POST   /import                    -> import
/// POST   /bulk                      -> bulk
/// GET    /{id}                      -> get_by_id (public templates: no auth)
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// GET    /{id}/preview              -> preview
/// POST   /{id}/duplicate            -> duplicate
/// GET    /{id}/export               -> export (JSON attachment)
/// GET    /{id}/fields               -> template_fields::list
/// POST   /{id}/fields               -> template_fields::create
/// POST   /{id}/fields/detect        -> template_fields::detect
/// PUT    /{id}/fields/{field_id}    -> template_fields::update
/// DELETE /{id}/fields/{field_id}    -> template_fields::delete
/// POST   /{id}/documents            -> documents::create_from_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list).post(templates::create))
        .route("/import", post(templates::import))
        .route("/bulk", post(templates::bulk))
        .route(
            "/{id}",
            get(templates::get_by_id)
                .put(templates::update)
                .delete(templates::delete),
        )
        .route("/{id}/preview", get(templates::preview))
        .route("/{id}/duplicate", post(templates::duplicate))
        .route("/{id}/export", get(templates::export))
        .route(
            "/{id}/fields",
            get(template_fields::list).post(template_fields::create),
        )
        .route("/{id}/fields/detect", post(template_fields::detect))
        .route(
            "/{id}/fields/{field_id}",
            put(template_fields::update).delete(template_fields::delete),
        )
        .route("/{id}/documents", post(documents::create_from_template))
}
