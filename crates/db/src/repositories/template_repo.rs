//! Repository for the `templates` table.

use docbuilder_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::template::{
    CreateTemplate, Template, TemplateDocumentStats, TemplateListItem, TemplateListParams,
    UpdateTemplate, Visibility,
};
use crate::models::template_field::{CreateTemplateField, FieldSyncResult};
use crate::repositories::{contains_pattern, TemplateFieldRepo};

const COLUMNS: &str = "id, title, description, content, owner_id, category_id, is_public, \
                        created_at, updated_at";

const LIST_SELECT: &str = "SELECT t.id, t.title, t.description, t.owner_id, \
        u.username AS owner_username, \
        t.category_id, c.name AS category_name, c.color AS category_color, \
        t.is_public, \
        (SELECT COUNT(*) FROM template_fields f WHERE f.template_id = t.id) AS field_count, \
        (SELECT COUNT(*) FROM documents d WHERE d.template_id = t.id) AS document_count, \
        t.created_at, t.updated_at \
     FROM templates t \
     JOIN users u ON u.id = t.owner_id \
     LEFT JOIN template_categories c ON c.id = t.category_id";

/// Suffix appended to the title of a duplicated template.
pub const COPY_SUFFIX: &str = " (copy)";

/// Template storage. Creating or changing content also reconciles fields.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a template and auto-create a field for each placeholder.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateTemplate,
    ) -> Result<(Template, FieldSyncResult), sqlx::Error> {
        let mut tx = pool.begin().await?;
        let template = Self::insert_inner(&mut tx, owner_id, input).await?;
        let sync = TemplateFieldRepo::sync_inner(&mut tx, template.id, &template.content).await?;
        tx.commit().await?;
        Ok((template, sync))
    }

    /// Insert a template with explicit field definitions (import).
    ///
    /// Placeholders without a matching definition still get a detected field;
    /// definitions the content never references are dropped.
    pub async fn create_with_fields(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateTemplate,
        fields: &[CreateTemplateField],
    ) -> Result<Template, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let template = Self::insert_inner(&mut tx, owner_id, input).await?;
        for field in fields {
            TemplateFieldRepo::insert_inner(&mut tx, template.id, field).await?;
        }
        TemplateFieldRepo::sync_inner(&mut tx, template.id, &template.content).await?;
        tx.commit().await?;
        Ok(template)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template the viewer may read: public, or owned by `viewer_id`.
    pub async fn find_visible(
        pool: &PgPool,
        id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates
             WHERE id = $1 AND (is_public OR owner_id = $2)"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(viewer_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template owned by `owner_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    fn list_where(params: &TemplateListParams) -> (String, u32) {
        let mut conditions = vec!["(t.owner_id = $1 OR t.is_public)".to_string()];
        let mut bind_idx = 2u32;

        if params.search.is_some() {
            conditions.push(format!(
                "(t.title ILIKE ${bind_idx} ESCAPE '\\' OR t.description ILIKE ${bind_idx} ESCAPE '\\')"
            ));
            bind_idx += 1;
        }
        if params.category_id.is_some() {
            conditions.push(format!("t.category_id = ${bind_idx}"));
            bind_idx += 1;
        }
        match params.visibility {
            Some(Visibility::My) => conditions.push("t.owner_id = $1".to_string()),
            Some(Visibility::Public) => conditions.push("t.is_public".to_string()),
            None => {}
        }

        (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
    }

    /// List templates visible to `viewer_id` (own and public) with filters.
    pub async fn list_visible(
        pool: &PgPool,
        viewer_id: DbId,
        params: &TemplateListParams,
    ) -> Result<Vec<TemplateListItem>, sqlx::Error> {
        let (where_clause, bind_idx) = Self::list_where(params);
        let query = format!(
            "{LIST_SELECT} {where_clause} ORDER BY {order} LIMIT ${bind_idx} OFFSET ${next_idx}",
            order = params.sort.order_by(),
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, TemplateListItem>(&query).bind(viewer_id);
        if let Some(ref search) = params.search {
            q = q.bind(contains_pattern(search));
        }
        if let Some(category_id) = params.category_id {
            q = q.bind(category_id);
        }
        q.bind(params.limit).bind(params.offset).fetch_all(pool).await
    }

    /// Total rows matching the same filters as [`Self::list_visible`].
    pub async fn count_visible(
        pool: &PgPool,
        viewer_id: DbId,
        params: &TemplateListParams,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = Self::list_where(params);
        let query = format!("SELECT COUNT(*) FROM templates t {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(viewer_id);
        if let Some(ref search) = params.search {
            q = q.bind(contains_pattern(search));
        }
        if let Some(category_id) = params.category_id {
            q = q.bind(category_id);
        }
        q.fetch_one(pool).await
    }

    /// Update a template. When the content changes the fields are
    /// reconciled in the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<(Template, FieldSyncResult)>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE templates SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                content = COALESCE($4, content),
                category_id = COALESCE($5, category_id),
                is_public = COALESCE($6, is_public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.description.as_deref())
            .bind(input.content.as_deref())
            .bind(input.category_id)
            .bind(input.is_public)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(template) = updated else {
            return Ok(None);
        };

        let sync = if input.content.is_some() {
            TemplateFieldRepo::sync_inner(&mut tx, template.id, &template.content).await?
        } else {
            FieldSyncResult::default()
        };
        tx.commit().await?;
        Ok(Some((template, sync)))
    }

    /// Delete a template; fields, documents and values cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy a template and its fields to `new_owner_id`. The copy is private.
    pub async fn duplicate(
        pool: &PgPool,
        id: DbId,
        new_owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let copy = Self::duplicate_inner(&mut tx, id, new_owner_id).await?;
        tx.commit().await?;
        Ok(copy)
    }

    async fn duplicate_inner(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        new_owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (title, description, content, owner_id, category_id, is_public)
             SELECT LEFT(title || $3, 200), description, content, $2, category_id, false
             FROM templates WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let copy = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(new_owner_id)
            .bind(COPY_SUFFIX)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(ref copy) = copy {
            sqlx::query(
                "INSERT INTO template_fields
                    (template_id, name, label, field_type, is_required, placeholder_text, options, sort_order)
                 SELECT $2, name, label, field_type, is_required, placeholder_text, options, sort_order
                 FROM template_fields WHERE template_id = $1",
            )
            .bind(id)
            .bind(copy.id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(copy)
    }

    /// Document counts across all users for one template.
    pub async fn document_stats(
        pool: &PgPool,
        id: DbId,
    ) -> Result<TemplateDocumentStats, sqlx::Error> {
        sqlx::query_as::<_, TemplateDocumentStats>(
            "SELECT COUNT(*) AS total_documents,
                    COUNT(*) FILTER (WHERE is_completed) AS completed_documents,
                    COUNT(*) FILTER (WHERE NOT is_completed) AS draft_documents
             FROM documents WHERE template_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    // -- bulk operations, restricted to templates owned by `owner_id` --

    /// Delete the caller's templates among `ids`. Returns rows deleted.
    pub async fn bulk_delete(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE owner_id = $1 AND id = ANY($2)")
            .bind(owner_id)
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set (or clear, with `None`) the category of the caller's templates.
    pub async fn bulk_set_category(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
        category_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE templates SET category_id = $3 WHERE owner_id = $1 AND id = ANY($2)",
        )
        .bind(owner_id)
        .bind(ids)
        .bind(category_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flip `is_public` on each of the caller's templates.
    pub async fn bulk_toggle_public(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE templates SET is_public = NOT is_public WHERE owner_id = $1 AND id = ANY($2)",
        )
        .bind(owner_id)
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Duplicate the caller's templates among `ids`, in one transaction.
    pub async fn bulk_duplicate(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Template>, sqlx::Error> {
        let owned: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM templates WHERE owner_id = $1 AND id = ANY($2) ORDER BY id",
        )
        .bind(owner_id)
        .bind(ids)
        .fetch_all(pool)
        .await?;

        let mut tx = pool.begin().await?;
        let mut copies = Vec::with_capacity(owned.len());
        for id in owned {
            if let Some(copy) = Self::duplicate_inner(&mut tx, id, owner_id).await? {
                copies.push(copy);
            }
        }
        tx.commit().await?;
        Ok(copies)
    }

    async fn insert_inner(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: DbId,
        input: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (title, description, content, owner_id, category_id, is_public)
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, COALESCE($6, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.title)
            .bind(input.description.as_deref())
            .bind(&input.content)
            .bind(owner_id)
            .bind(input.category_id)
            .bind(input.is_public)
            .fetch_one(&mut **tx)
            .await
    }
}
