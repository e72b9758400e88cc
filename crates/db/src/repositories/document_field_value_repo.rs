//! Repository for the `document_field_values` table.

use docbuilder_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::document::FieldValueInput;
use crate::models::document_field_value::{DocumentFieldValue, NamedFieldValue};

const COLUMNS: &str = "id, document_id, field_id, value, created_at, updated_at";

/// Stored values of a document's fields.
pub struct DocumentFieldValueRepo;

impl DocumentFieldValueRepo {
    pub async fn list_for_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<DocumentFieldValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_field_values WHERE document_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, DocumentFieldValue>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Values joined with their field names, in field display order.
    pub async fn list_named(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<NamedFieldValue>, sqlx::Error> {
        sqlx::query_as::<_, NamedFieldValue>(
            "SELECT v.field_id, f.name, f.label, v.value
             FROM document_field_values v
             JOIN template_fields f ON f.id = v.field_id
             WHERE v.document_id = $1
             ORDER BY f.sort_order, f.id",
        )
        .bind(document_id)
        .fetch_all(pool)
        .await
    }

    /// Delete every value of the document and insert `values`.
    pub(crate) async fn replace_inner(
        tx: &mut Transaction<'_, Postgres>,
        document_id: DbId,
        values: &[FieldValueInput],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM document_field_values WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut **tx)
            .await?;

        for v in values {
            sqlx::query(
                "INSERT INTO document_field_values (document_id, field_id, value) VALUES ($1, $2, $3)",
            )
            .bind(document_id)
            .bind(v.field_id)
            .bind(&v.value)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
