//! Handlers for the `/categories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use docbuilder_core::error::CoreError;
use docbuilder_core::types::DbId;
use docbuilder_core::validation::{validate_category_name, validate_hex_color};
use docbuilder_db::models::category::{
    CategoryWithCount, CreateCategory, TemplateCategory, UpdateCategory,
};
use docbuilder_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<TemplateCategory>>)> {
    let name = validate_category_name(&input.name)?;
    if let Some(ref color) = input.color {
        validate_hex_color(color)?;
    }
    let category = CategoryRepo::create(&state.pool, &CreateCategory { name, ..input }).await?;

    tracing::info!(category_id = category.id, user_id = auth.user_id, "Category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    let categories = CategoryRepo::list_with_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateCategory>>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<TemplateCategory>>> {
    let name = input
        .name
        .as_deref()
        .map(validate_category_name)
        .transpose()?;
    if let Some(ref color) = input.color {
        validate_hex_color(color)?;
    }
    let category = CategoryRepo::update(&state.pool, id, &UpdateCategory { name, ..input })
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(category_id = id, user_id = auth.user_id, "Category updated");
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
///
/// Templates filed under the category become uncategorised.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(category_id = id, user_id = auth.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
