//! Account administration.

use axum::extract::{Path, State};
use axum::Json;
use docbuilder_core::error::CoreError;
use docbuilder_core::types::DbId;
use docbuilder_db::models::user::{UpdateUserAccess, UserResponse};
use docbuilder_db::repositories::{RefreshTokenRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Change another account's role or active flag. Deactivating an account
/// also revokes its refresh tokens; access tokens already issued stay valid
/// until they expire.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserAccess>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Administrators cannot change their own role or status".to_string(),
        )));
    }

    let user = UserRepo::update_access(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        RefreshTokenRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        role = %user.role,
        is_active = user.is_active,
        "Account access changed",
    );
    Ok(Json(DataResponse { data: user.into() }))
}
