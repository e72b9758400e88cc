//! Home dashboard statistics.

use serde::Serialize;
use sqlx::FromRow;

use crate::models::document::DocumentListItem;
use crate::models::template::TemplateListItem;

/// Site-wide counters, visible to anonymous callers.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct SiteStats {
    pub public_templates: i64,
    /// Distinct users who own at least one template.
    pub template_authors: i64,
    pub total_documents: i64,
}

/// Counters and recent items for the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub templates: i64,
    pub documents: i64,
    pub recent_templates: Vec<TemplateListItem>,
    pub recent_documents: Vec<DocumentListItem>,
    /// Account created within the last five minutes.
    pub is_new_user: bool,
}
