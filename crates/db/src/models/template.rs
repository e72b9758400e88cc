//! Template entity model, list/filter parameters and DTOs.

use docbuilder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub owner_id: DbId,
    pub category_id: Option<DbId>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Template row enriched for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateListItem {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub owner_id: DbId,
    pub owner_username: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub is_public: bool,
    pub field_count: i64,
    pub document_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Document counts for one template, across all users.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TemplateDocumentStats {
    pub total_documents: i64,
    pub completed_documents: i64,
    pub draft_documents: i64,
}

/// Which subset of visible templates to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only templates owned by the caller.
    My,
    /// Only public templates (including the caller's own public ones).
    Public,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSort {
    #[default]
    Newest,
    Oldest,
    Title,
    Updated,
}

impl TemplateSort {
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "t.created_at DESC, t.id DESC",
            Self::Oldest => "t.created_at ASC, t.id ASC",
            Self::Title => "LOWER(t.title) ASC, t.id ASC",
            Self::Updated => "t.updated_at DESC, t.id DESC",
        }
    }
}

/// Filters for [`TemplateRepo::list_visible`](crate::repositories::TemplateRepo::list_visible).
#[derive(Debug, Clone, Default)]
pub struct TemplateListParams {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    pub visibility: Option<Visibility>,
    pub sort: TemplateSort,
    pub limit: i64,
    pub offset: i64,
}

/// DTO for creating a template. Title and content are already validated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub category_id: Option<DbId>,
    pub is_public: Option<bool>,
}

/// DTO for updating a template. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<DbId>,
    pub is_public: Option<bool>,
}
