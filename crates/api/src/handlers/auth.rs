//! Account endpoints: signup, login, token refresh, logout and `me`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use docbuilder_core::error::CoreError;
use docbuilder_core::roles::Role;
use docbuilder_core::validation::{validate_email, validate_password, validate_username};
use docbuilder_db::models::user::{CreateUser, User, UserResponse};
use docbuilder_db::repositories::{RefreshTokenRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{hash_refresh_token, RefreshSecret};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive wrong passwords that lock an account.
const MAX_FAILED_ATTEMPTS: i32 = 5;
const LOCKOUT_MINS: i64 = 15;

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair handed out by signup, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}

fn ensure_active(user: &User) -> AppResult<()> {
    if user.is_active {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".to_string(),
        )))
    }
}

/// Issue an access token and a stored refresh token for `user`.
async fn start_session(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = jwt
        .issue_access_token(user.id, user.role)
        .map_err(|e| AppError::InternalError(format!("Token signing failed: {e}")))?;

    let refresh = RefreshSecret::generate();
    RefreshTokenRepo::issue(
        &state.pool,
        user.id,
        &refresh.hash,
        jwt.refresh_expires_at(Utc::now()),
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.token,
        expires_in: jwt.access_ttl_secs(),
        user: user.into(),
    })
}

/// POST /api/v1/auth/signup
///
/// New accounts get the `user` role. A taken username or email is a 409
/// raised by the unique constraints.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let username = input.username.trim();
    let email = input.email.trim();
    validate_username(username)?;
    validate_email(email)?;
    validate_password(&input.password, state.config.min_password_length)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::User,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Account created");
    let session = start_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/v1/auth/login
///
/// A locked account is refused with 403 even when the password is right.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(|| unauthorized(BAD_CREDENTIALS))?;

    ensure_active(&user)?;
    if user.is_locked(Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".to_string(),
        )));
    }

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored password hash is unusable: {e}")))?;
    if !matches {
        let lock_until = Utc::now() + Duration::minutes(LOCKOUT_MINS);
        let updated =
            UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, lock_until)
                .await?;
        if updated.is_locked(Utc::now()) {
            tracing::warn!(
                user_id = user.id,
                failures = updated.failed_login_count,
                "Account locked",
            );
        }
        return Err(unauthorized(BAD_CREDENTIALS));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Login");
    Ok(Json(start_session(&state, user).await?))
}

/// POST /api/v1/auth/refresh
///
/// The presented token is spent; the response carries its replacement.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let spent = RefreshTokenRepo::consume(&state.pool, &hash_refresh_token(&input.refresh_token))
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired refresh token"))?;

    let user = UserRepo::find_by_id(&state.pool, spent.user_id)
        .await?
        .ok_or_else(|| unauthorized("Account no longer exists"))?;
    ensure_active(&user)?;

    Ok(Json(start_session(&state, user).await?))
}

/// POST /api/v1/auth/logout
///
/// Signs the caller out everywhere by revoking all of their refresh tokens.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    let revoked = RefreshTokenRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, revoked, "Logout");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}
