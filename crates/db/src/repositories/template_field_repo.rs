//! Repository for the `template_fields` table, including placeholder
//! reconciliation.

use docbuilder_core::reconcile::{plan_field_sync, NewField};
use docbuilder_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::template_field::{
    CreateTemplateField, FieldSyncResult, TemplateField, UpdateTemplateField,
};

pub(crate) const COLUMNS: &str = "id, template_id, name, label, field_type, is_required, \
                                   placeholder_text, options, sort_order, created_at, updated_at";

/// Field definitions of a template.
pub struct TemplateFieldRepo;

impl From<&NewField> for CreateTemplateField {
    fn from(f: &NewField) -> Self {
        Self {
            name: f.name.clone(),
            label: f.label.clone(),
            field_type: f.field_type.as_str().to_string(),
            is_required: f.is_required,
            placeholder_text: f.placeholder_text.clone(),
            options: None,
            sort_order: f.sort_order,
        }
    }
}

impl TemplateFieldRepo {
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        input: &CreateTemplateField,
    ) -> Result<TemplateField, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let field = Self::insert_inner(&mut tx, template_id, input).await?;
        tx.commit().await?;
        Ok(field)
    }

    /// Fields of a template in display order.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TemplateField>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_fields
             WHERE template_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Find a field scoped to its template.
    pub async fn find(
        pool: &PgPool,
        template_id: DbId,
        field_id: DbId,
    ) -> Result<Option<TemplateField>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM template_fields WHERE id = $1 AND template_id = $2");
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(field_id)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// Next free `sort_order` slot after the current last field.
    pub async fn next_sort_order(pool: &PgPool, template_id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(sort_order) + 10, 0) FROM template_fields WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        template_id: DbId,
        field_id: DbId,
        input: &UpdateTemplateField,
    ) -> Result<Option<TemplateField>, sqlx::Error> {
        let query = format!(
            "UPDATE template_fields SET
                label = COALESCE($3, label),
                field_type = COALESCE($4, field_type),
                is_required = COALESCE($5, is_required),
                placeholder_text = COALESCE($6, placeholder_text),
                options = COALESCE($7, options),
                sort_order = COALESCE($8, sort_order)
             WHERE id = $1 AND template_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(field_id)
            .bind(template_id)
            .bind(input.label.as_deref())
            .bind(input.field_type.as_deref())
            .bind(input.is_required)
            .bind(input.placeholder_text.as_deref())
            .bind(input.options.as_deref())
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a field. Stored document values for it cascade.
    pub async fn delete(pool: &PgPool, template_id: DbId, field_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM template_fields WHERE id = $1 AND template_id = $2")
            .bind(field_id)
            .bind(template_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reconcile the template's fields with the placeholders in `content`.
    pub async fn sync_with_content(
        pool: &PgPool,
        template_id: DbId,
        content: &str,
    ) -> Result<FieldSyncResult, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::sync_inner(&mut tx, template_id, content).await?;
        tx.commit().await?;
        Ok(result)
    }

    pub(crate) async fn insert_inner(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        input: &CreateTemplateField,
    ) -> Result<TemplateField, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_fields
                (template_id, name, label, field_type, is_required, placeholder_text, options, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(template_id)
            .bind(&input.name)
            .bind(&input.label)
            .bind(&input.field_type)
            .bind(input.is_required)
            .bind(&input.placeholder_text)
            .bind(input.options.as_deref())
            .bind(input.sort_order)
            .fetch_one(&mut **tx)
            .await
    }

    /// Create missing fields and drop orphaned ones inside `tx`.
    pub(crate) async fn sync_inner(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        content: &str,
    ) -> Result<FieldSyncResult, sqlx::Error> {
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT name FROM template_fields WHERE template_id = $1")
                .bind(template_id)
                .fetch_all(&mut **tx)
                .await?;

        let plan = plan_field_sync(content, &existing);
        if plan.is_empty() {
            return Ok(FieldSyncResult::default());
        }

        if !plan.to_delete.is_empty() {
            sqlx::query("DELETE FROM template_fields WHERE template_id = $1 AND name = ANY($2)")
                .bind(template_id)
                .bind(&plan.to_delete)
                .execute(&mut **tx)
                .await?;
        }

        let mut created = Vec::with_capacity(plan.to_create.len());
        for field in &plan.to_create {
            created.push(Self::insert_inner(tx, template_id, &CreateTemplateField::from(field)).await?);
        }

        tracing::debug!(
            template_id,
            created = created.len(),
            deleted = plan.to_delete.len(),
            "Reconciled template fields",
        );

        Ok(FieldSyncResult {
            created,
            deleted: plan.to_delete,
        })
    }
}
