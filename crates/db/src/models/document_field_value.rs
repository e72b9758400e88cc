//! Document field value model.

use docbuilder_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `document_field_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentFieldValue {
    pub id: DbId,
    pub document_id: DbId,
    pub field_id: DbId,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A value joined with its field's name and label, in field display order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NamedFieldValue {
    pub field_id: DbId,
    pub name: String,
    pub label: String,
    pub value: String,
}
