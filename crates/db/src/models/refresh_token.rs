//! Issued refresh tokens.

use docbuilder_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A `refresh_tokens` row. The plaintext token is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
