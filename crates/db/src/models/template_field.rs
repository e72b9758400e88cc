//! Template field model and DTOs.

use docbuilder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `template_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateField {
    pub id: DbId,
    pub template_id: DbId,
    pub name: String,
    pub label: String,
    /// One of `docbuilder_core::field_types::VALID_FIELD_TYPES`.
    pub field_type: String,
    pub is_required: bool,
    pub placeholder_text: String,
    /// Raw select options, JSON array or newline separated.
    pub options: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a field.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateField {
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub is_required: bool,
    pub placeholder_text: String,
    pub options: Option<String>,
    pub sort_order: i32,
}

/// DTO for updating a field. The name is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateField {
    pub label: Option<String>,
    pub field_type: Option<String>,
    pub is_required: Option<bool>,
    pub placeholder_text: Option<String>,
    pub options: Option<String>,
    pub sort_order: Option<i32>,
}

/// Outcome of applying a reconciliation plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldSyncResult {
    pub created: Vec<TemplateField>,
    pub deleted: Vec<String>,
}
