//! Aggregate queries for the home dashboard.

use docbuilder_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{SiteStats, UserStats};
use crate::models::document::{DocumentListParams, DocumentSort};
use crate::models::template::{TemplateListParams, TemplateSort, Visibility};
use crate::repositories::{DocumentRepo, TemplateRepo};

/// Number of recent templates and documents shown per user.
pub const RECENT_ITEMS: i64 = 3;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn site_stats(pool: &PgPool) -> Result<SiteStats, sqlx::Error> {
        sqlx::query_as::<_, SiteStats>(
            "SELECT
                (SELECT COUNT(*) FROM templates WHERE is_public) AS public_templates,
                (SELECT COUNT(DISTINCT owner_id) FROM templates) AS template_authors,
                (SELECT COUNT(*) FROM documents) AS total_documents",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn user_stats(pool: &PgPool, user_id: DbId) -> Result<UserStats, sqlx::Error> {
        let (templates, documents, is_new_user): (i64, i64, bool) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM templates WHERE owner_id = $1),
                (SELECT COUNT(*) FROM documents WHERE created_by = $1),
                COALESCE(
                    (SELECT created_at > NOW() - INTERVAL '5 minutes' FROM users WHERE id = $1),
                    false
                )",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let recent_templates = TemplateRepo::list_visible(
            pool,
            user_id,
            &TemplateListParams {
                visibility: Some(Visibility::My),
                sort: TemplateSort::Updated,
                limit: RECENT_ITEMS,
                ..Default::default()
            },
        )
        .await?;

        let recent_documents = DocumentRepo::list_for_user(
            pool,
            user_id,
            &DocumentListParams {
                sort: DocumentSort::Updated,
                limit: RECENT_ITEMS,
                ..Default::default()
            },
        )
        .await?;

        Ok(UserStats {
            templates,
            documents,
            recent_templates,
            recent_documents,
            is_new_user,
        })
    }
}
