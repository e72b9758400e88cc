//! Repository for the `documents` table.

use docbuilder_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{
    CreateDocument, Document, DocumentListItem, DocumentListParams, DocumentStats, DocumentStatus,
    UpdateDocument,
};
use crate::repositories::{contains_pattern, DocumentFieldValueRepo};

const COLUMNS: &str = "id, title, template_id, created_by, is_completed, created_at, updated_at";

const LIST_SELECT: &str = "SELECT d.id, d.title, d.template_id, t.title AS template_title, \
        d.is_completed, d.created_at, d.updated_at \
     FROM documents d \
     JOIN templates t ON t.id = d.template_id";

/// Suffix appended to the title of a duplicated document.
pub const COPY_SUFFIX: &str = " (copy)";

/// Documents are private to their creator; every read is scoped by user.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a document and its field values in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO documents (title, template_id, created_by, is_completed)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(&input.title)
            .bind(input.template_id)
            .bind(input.created_by)
            .bind(input.is_completed)
            .fetch_one(&mut *tx)
            .await?;

        DocumentFieldValueRepo::replace_inner(&mut tx, document.id, &input.values).await?;
        tx.commit().await?;
        Ok(document)
    }

    /// Find a document created by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND created_by = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    fn list_where(params: &DocumentListParams) -> (String, u32) {
        let mut conditions = vec!["d.created_by = $1".to_string()];
        let mut bind_idx = 2u32;

        if params.search.is_some() {
            conditions.push(format!(
                "(d.title ILIKE ${bind_idx} ESCAPE '\\' OR t.title ILIKE ${bind_idx} ESCAPE '\\')"
            ));
            bind_idx += 1;
        }
        if params.template_id.is_some() {
            conditions.push(format!("d.template_id = ${bind_idx}"));
            bind_idx += 1;
        }
        match params.status {
            Some(DocumentStatus::Completed) => conditions.push("d.is_completed".to_string()),
            Some(DocumentStatus::Draft) => conditions.push("NOT d.is_completed".to_string()),
            None => {}
        }

        (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
    }

    /// List the user's documents with filters.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        params: &DocumentListParams,
    ) -> Result<Vec<DocumentListItem>, sqlx::Error> {
        let (where_clause, bind_idx) = Self::list_where(params);
        let query = format!(
            "{LIST_SELECT} {where_clause} ORDER BY {order} LIMIT ${bind_idx} OFFSET ${next_idx}",
            order = params.sort.order_by(),
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, DocumentListItem>(&query).bind(user_id);
        if let Some(ref search) = params.search {
            q = q.bind(contains_pattern(search));
        }
        if let Some(template_id) = params.template_id {
            q = q.bind(template_id);
        }
        q.bind(params.limit).bind(params.offset).fetch_all(pool).await
    }

    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        params: &DocumentListParams,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = Self::list_where(params);
        let query = format!(
            "SELECT COUNT(*) FROM documents d JOIN templates t ON t.id = d.template_id {where_clause}"
        );

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(user_id);
        if let Some(ref search) = params.search {
            q = q.bind(contains_pattern(search));
        }
        if let Some(template_id) = params.template_id {
            q = q.bind(template_id);
        }
        q.fetch_one(pool).await
    }

    /// Unfiltered counters for the user's documents.
    pub async fn stats_for_user(pool: &PgPool, user_id: DbId) -> Result<DocumentStats, sqlx::Error> {
        sqlx::query_as::<_, DocumentStats>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE is_completed) AS completed,
                    COUNT(*) FILTER (WHERE NOT is_completed) AS draft,
                    COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS recent
             FROM documents WHERE created_by = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Update title/completion and, when given, replace all field values.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE documents SET
                title = COALESCE($2, title),
                is_completed = COALESCE($3, is_completed)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.is_completed)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(document) = updated else {
            return Ok(None);
        };
        if let Some(ref values) = input.values {
            DocumentFieldValueRepo::replace_inner(&mut tx, document.id, values).await?;
        }
        tx.commit().await?;
        Ok(Some(document))
    }

    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy a document and its values. The copy starts as a draft.
    pub async fn duplicate(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO documents (title, template_id, created_by, is_completed)
             SELECT LEFT(title || $3, 200), template_id, created_by, false
             FROM documents WHERE id = $1 AND created_by = $2
             RETURNING {COLUMNS}"
        );
        let copy = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(user_id)
            .bind(COPY_SUFFIX)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref copy) = copy {
            sqlx::query(
                "INSERT INTO document_field_values (document_id, field_id, value)
                 SELECT $2, field_id, value FROM document_field_values WHERE document_id = $1",
            )
            .bind(id)
            .bind(copy.id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(copy)
    }

    /// The user's most recently updated documents for one template.
    pub async fn recent_for_template(
        pool: &PgPool,
        template_id: DbId,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<DocumentListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT} WHERE d.template_id = $1 AND d.created_by = $2
             ORDER BY d.updated_at DESC, d.id DESC LIMIT $3"
        );
        sqlx::query_as::<_, DocumentListItem>(&query)
            .bind(template_id)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
