//! Template category model and DTOs.

use docbuilder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `template_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateCategory {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category with the number of templates filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub template_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    /// `#RRGGBB`; defaults to `#007bff`.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}
