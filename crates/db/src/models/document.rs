//! Document entity model, list parameters and DTOs.

use docbuilder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub title: String,
    pub template_id: DbId,
    pub created_by: DbId,
    pub is_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Document row with its template title, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentListItem {
    pub id: DbId,
    pub title: String,
    pub template_id: DbId,
    pub template_title: String,
    pub is_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Per-user document counters shown alongside the list.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DocumentStats {
    pub total: i64,
    pub completed: i64,
    pub draft: i64,
    /// Documents created in the last 7 days.
    pub recent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSort {
    #[default]
    Updated,
    Newest,
    Title,
}

impl DocumentSort {
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Updated => "d.updated_at DESC, d.id DESC",
            Self::Newest => "d.created_at DESC, d.id DESC",
            Self::Title => "LOWER(d.title) ASC, d.id ASC",
        }
    }
}

/// Filters for [`DocumentRepo::list_for_user`](crate::repositories::DocumentRepo::list_for_user).
#[derive(Debug, Clone, Default)]
pub struct DocumentListParams {
    /// Case-insensitive substring of the document or template title.
    pub search: Option<String>,
    pub template_id: Option<DbId>,
    pub status: Option<DocumentStatus>,
    pub sort: DocumentSort,
    pub limit: i64,
    pub offset: i64,
}

/// A single `(field, value)` pair to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValueInput {
    pub field_id: DbId,
    pub value: String,
}

/// DTO for creating a document together with its values.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub title: String,
    pub template_id: DbId,
    pub created_by: DbId,
    pub is_completed: bool,
    pub values: Vec<FieldValueInput>,
}

/// DTO for updating a document.
///
/// When `values` is `Some`, all existing values are replaced.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub values: Option<Vec<FieldValueInput>>,
}
