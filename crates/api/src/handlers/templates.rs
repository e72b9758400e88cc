//! Handlers for the `/templates` resource.
//!
//! Templates are readable by their owner, or by anyone when public. Only the
//! owner may change one. A template the caller may not see answers 404 so
//! private templates do not leak their existence.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use docbuilder_core::error::CoreError;
use docbuilder_core::export::filename_stem;
use docbuilder_core::field_types::{sample_value, FieldType};
use docbuilder_core::placeholders::{extract_field_names, render, UnfilledPolicy};
use docbuilder_core::types::DbId;
use docbuilder_core::validation::{
    validate_field_definition, validate_sort_order, validate_template_content,
    validate_template_title,
};
use docbuilder_db::models::document::DocumentListItem;
use docbuilder_db::models::template::{
    CreateTemplate, Template, TemplateDocumentStats, TemplateListItem, TemplateListParams,
    TemplateSort, UpdateTemplate, Visibility,
};
use docbuilder_db::models::template_field::{CreateTemplateField, FieldSyncResult, TemplateField};
use docbuilder_db::repositories::{DocumentRepo, TemplateFieldRepo, TemplateRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::resolve_page;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Recent documents shown on the template detail.
const RECENT_DOCUMENTS: i64 = 5;

/// Version tag written into template exports.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

pub(crate) fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Template",
        id,
    })
}

/// A template the viewer may read, or 404.
pub(crate) async fn visible_template(
    state: &AppState,
    id: DbId,
    viewer_id: Option<DbId>,
) -> AppResult<Template> {
    TemplateRepo::find_visible(&state.pool, id, viewer_id)
        .await?
        .ok_or_else(|| template_not_found(id))
}

/// A template owned by `owner_id`, or 404.
pub(crate) async fn owned_template(
    state: &AppState,
    id: DbId,
    owner_id: DbId,
) -> AppResult<Template> {
    TemplateRepo::find_owned(&state.pool, id, owner_id)
        .await?
        .ok_or_else(|| template_not_found(id))
}

fn trim_description(description: Option<&str>) -> Option<String> {
    description.map(|d| d.trim().to_string())
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    pub visibility: Option<Visibility>,
    pub sort: Option<TemplateSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A template with its fields after a create or update, plus what the
/// placeholder reconciliation changed.
#[derive(Debug, Serialize)]
pub struct SavedTemplate {
    #[serde(flatten)]
    pub template: Template,
    pub fields: Vec<TemplateField>,
    pub field_sync: FieldSyncResult,
}

#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
    pub fields: Vec<TemplateField>,
    /// Field names referenced in the content, sorted.
    pub placeholders: Vec<String>,
    pub stats: TemplateDocumentStats,
    /// The caller's latest documents from this template.
    pub recent_documents: Vec<DocumentListItem>,
    pub is_owner: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub template_id: DbId,
    pub title: String,
    pub content: String,
    /// The example value used for each field.
    pub sample_data: BTreeMap<String, String>,
}

/// Portable form of a template, produced by export and accepted by import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateExport {
    #[serde(default = "default_export_version")]
    pub version: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub fields: Vec<ExportedField>,
}

fn default_export_version() -> u32 {
    EXPORT_FORMAT_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedField {
    pub name: String,
    pub label: String,
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub placeholder_text: String,
    pub options: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl From<&TemplateField> for ExportedField {
    fn from(f: &TemplateField) -> Self {
        Self {
            name: f.name.clone(),
            label: f.label.clone(),
            field_type: f.field_type.clone(),
            is_required: f.is_required,
            placeholder_text: f.placeholder_text.clone(),
            options: f.options.clone(),
            sort_order: f.sort_order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Delete,
    Duplicate,
    ChangeCategory,
    TogglePublic,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub template_ids: Vec<DbId>,
    /// Target for `change_category`; `null` clears the category.
    pub category_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub action: BulkAction,
    /// Templates changed. Ids the caller does not own are skipped.
    pub affected: u64,
    /// Copies made by `duplicate`.
    pub created: Vec<Template>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/templates
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TemplateListQuery>,
) -> AppResult<Json<PageResponse<TemplateListItem>>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let search = params
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let list_params = TemplateListParams {
        search,
        category_id: params.category_id,
        visibility: params.visibility,
        sort: params.sort.unwrap_or_default(),
        limit,
        offset,
    };

    let items = TemplateRepo::list_visible(&state.pool, auth.user_id, &list_params).await?;
    let total = TemplateRepo::count_visible(&state.pool, auth.user_id, &list_params).await?;

    Ok(Json(PageResponse {
        data: items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/templates
///
/// Fields are created for every placeholder in the content.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateTemplate>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedTemplate>>)> {
    let input = CreateTemplate {
        title: validate_template_title(&input.title)?,
        description: trim_description(input.description.as_deref()),
        content: validate_template_content(&input.content)?,
        ..input
    };

    let (template, field_sync) = TemplateRepo::create(&state.pool, auth.user_id, &input).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, template.id).await?;

    tracing::info!(
        template_id = template.id,
        user_id = auth.user_id,
        detected = field_sync.created.len(),
        "Template created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SavedTemplate {
                template,
                fields,
                field_sync,
            },
        }),
    ))
}

/// GET /api/v1/templates/{id}
///
/// Public templates are readable without authentication.
pub async fn get_by_id(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateDetail>>> {
    let viewer_id = caller.user_id();
    let template = visible_template(&state, id, viewer_id).await?;

    let fields = TemplateFieldRepo::list_for_template(&state.pool, id).await?;
    let stats = TemplateRepo::document_stats(&state.pool, id).await?;
    let recent_documents = match viewer_id {
        Some(user_id) => {
            DocumentRepo::recent_for_template(&state.pool, id, user_id, RECENT_DOCUMENTS).await?
        }
        None => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: TemplateDetail {
            placeholders: extract_field_names(&template.content),
            is_owner: viewer_id == Some(template.owner_id),
            template,
            fields,
            stats,
            recent_documents,
        },
    }))
}

/// PUT /api/v1/templates/{id}
///
/// Changing the content re-runs field detection: new placeholders get a
/// field, fields whose placeholder disappeared are deleted.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<Json<DataResponse<SavedTemplate>>> {
    owned_template(&state, id, auth.user_id).await?;

    let input = UpdateTemplate {
        title: input
            .title
            .as_deref()
            .map(validate_template_title)
            .transpose()?,
        description: trim_description(input.description.as_deref()),
        content: input
            .content
            .as_deref()
            .map(validate_template_content)
            .transpose()?,
        ..input
    };

    let (template, field_sync) = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, id).await?;

    tracing::info!(
        template_id = id,
        user_id = auth.user_id,
        created = field_sync.created.len(),
        deleted = field_sync.deleted.len(),
        "Template updated",
    );

    Ok(Json(DataResponse {
        data: SavedTemplate {
            template,
            fields,
            field_sync,
        },
    }))
}

/// DELETE /api/v1/templates/{id}
///
/// Fields, documents and their values are deleted with the template.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_template(&state, id, auth.user_id).await?;
    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(template_not_found(id));
    }
    tracing::info!(template_id = id, user_id = auth.user_id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/preview
///
/// Render the content with an example value for every field.
pub async fn preview(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplatePreview>>> {
    let template = visible_template(&state, id, caller.user_id()).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, id).await?;

    let today = Utc::now().date_naive();
    let mut sample_data: BTreeMap<String, String> = fields
        .iter()
        .map(|f| (f.name.clone(), sample_value(&f.name, today)))
        .collect();
    // Placeholders added since the last detection still get an example.
    for name in extract_field_names(&template.content) {
        sample_data
            .entry(name)
            .or_insert_with_key(|name| sample_value(name, today));
    }

    let values: HashMap<String, String> = sample_data.clone().into_iter().collect();
    let rendered = render(&template.content, &values, UnfilledPolicy::Keep);

    Ok(Json(DataResponse {
        data: TemplatePreview {
            template_id: template.id,
            title: template.title,
            content: rendered.text,
            sample_data,
        },
    }))
}

/// POST /api/v1/templates/{id}/duplicate
///
/// Copy a visible template and its fields into the caller's library. The
/// copy is private.
pub async fn duplicate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Template>>)> {
    visible_template(&state, id, Some(auth.user_id)).await?;
    let copy = TemplateRepo::duplicate(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    tracing::info!(
        template_id = id,
        copy_id = copy.id,
        user_id = auth.user_id,
        "Template duplicated",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}

/// GET /api/v1/templates/{id}/export
///
/// Download the template and its field definitions as JSON.
pub async fn export(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = visible_template(&state, id, caller.user_id()).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, id).await?;

    let export = TemplateExport {
        version: EXPORT_FORMAT_VERSION,
        title: template.title.clone(),
        description: template.description,
        content: template.content,
        fields: fields.iter().map(ExportedField::from).collect(),
    };
    let body = serde_json::to_vec_pretty(&export)
        .map_err(|e| AppError::InternalError(format!("Template export failed: {e}")))?;

    let disposition = format!(
        "attachment; filename=\"{}.json\"",
        filename_stem(&template.title)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::InternalError(format!("Invalid export filename: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/v1/templates/import
///
/// Create a private template from an export. Field definitions for
/// placeholders the content does not use are dropped; placeholders with no
/// definition get a detected field.
pub async fn import(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<TemplateExport>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedTemplate>>)> {
    if input.version != EXPORT_FORMAT_VERSION {
        return Err(AppError::BadRequest(format!(
            "Unsupported template export version {}",
            input.version
        )));
    }

    let create = CreateTemplate {
        title: validate_template_title(&input.title)?,
        description: Some(input.description.trim().to_string()),
        content: validate_template_content(&input.content)?,
        category_id: None,
        is_public: Some(false),
    };

    let used = extract_field_names(&create.content);
    let mut fields = Vec::with_capacity(input.fields.len());
    for f in input.fields.iter().filter(|f| used.contains(&f.name)) {
        let field_type = FieldType::parse(&f.field_type).map_err(CoreError::Validation)?;
        validate_field_definition(
            &f.name,
            &f.label,
            field_type,
            f.options.as_deref(),
            Some(&f.placeholder_text),
        )?;
        validate_sort_order(f.sort_order)?;
        fields.push(CreateTemplateField {
            name: f.name.clone(),
            label: f.label.trim().to_string(),
            field_type: field_type.as_str().to_string(),
            is_required: f.is_required,
            placeholder_text: f.placeholder_text.clone(),
            options: f.options.clone(),
            sort_order: f.sort_order,
        });
    }

    let template =
        TemplateRepo::create_with_fields(&state.pool, auth.user_id, &create, &fields).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, template.id).await?;

    tracing::info!(
        template_id = template.id,
        user_id = auth.user_id,
        fields = fields.len(),
        "Template imported",
    );

    let field_sync = FieldSyncResult {
        created: fields.clone(),
        deleted: Vec::new(),
    };
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SavedTemplate {
                template,
                fields,
                field_sync,
            },
        }),
    ))
}

/// POST /api/v1/templates/bulk
///
/// Apply one action to several of the caller's templates.
pub async fn bulk(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BulkRequest>,
) -> AppResult<Json<DataResponse<BulkResult>>> {
    if input.template_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No templates selected".to_string(),
        )));
    }

    let ids = &input.template_ids;
    let mut created = Vec::new();
    let affected = match input.action {
        BulkAction::Delete => TemplateRepo::bulk_delete(&state.pool, auth.user_id, ids).await?,
        BulkAction::Duplicate => {
            created = TemplateRepo::bulk_duplicate(&state.pool, auth.user_id, ids).await?;
            created.len() as u64
        }
        BulkAction::ChangeCategory => {
            TemplateRepo::bulk_set_category(&state.pool, auth.user_id, ids, input.category_id)
                .await?
        }
        BulkAction::TogglePublic => {
            TemplateRepo::bulk_toggle_public(&state.pool, auth.user_id, ids).await?
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        action = ?input.action,
        requested = ids.len(),
        affected,
        "Bulk template action",
    );

    Ok(Json(DataResponse {
        data: BulkResult {
            action: input.action,
            affected,
            created,
        },
    }))
}
