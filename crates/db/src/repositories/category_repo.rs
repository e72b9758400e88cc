//! Repository for the `template_categories` table.

use docbuilder_core::types::DbId;
use docbuilder_core::validation::DEFAULT_CATEGORY_COLOR;
use sqlx::PgPool;

use crate::models::category::{CategoryWithCount, CreateCategory, TemplateCategory, UpdateCategory};

const COLUMNS: &str = "id, name, description, color, created_at, updated_at";

/// CRUD for shared template categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
    ) -> Result<TemplateCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_categories (name, description, color)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, $4))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.color.as_deref())
            .bind(DEFAULT_CATEGORY_COLOR)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM template_categories WHERE id = $1");
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories by name, with their template counts.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.description, c.color,
                    COUNT(t.id) AS template_count,
                    c.created_at, c.updated_at
             FROM template_categories c
             LEFT JOIN templates t ON t.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<TemplateCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE template_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.color.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Templates filed under it become uncategorised.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM template_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
