//! Handlers for documents: creation from a template, the `/documents`
//! resource, and exports.
//!
//! Documents are private to their creator. Values arrive keyed by field name
//! and are stored against the template's field ids.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use docbuilder_core::error::CoreError;
use docbuilder_core::export::{export_document, export_filename, ExportDocument, ExportFormat};
use docbuilder_core::field_types::parse_options;
use docbuilder_core::placeholders::{render, RenderedContent, UnfilledPolicy};
use docbuilder_core::types::DbId;
use docbuilder_core::validation::{validate_completion, validate_document_title};
use docbuilder_db::models::document::{
    CreateDocument, Document, DocumentListItem, DocumentListParams, DocumentSort, DocumentStats,
    DocumentStatus, FieldValueInput, UpdateDocument,
};
use docbuilder_db::models::template::Template;
use docbuilder_db::models::template_field::TemplateField;
use docbuilder_db::repositories::{
    DocumentFieldValueRepo, DocumentRepo, TemplateFieldRepo, TemplateRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::templates::{template_not_found, visible_template};
use crate::middleware::auth::AuthUser;
use crate::query::{resolve_page, RenderParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn document_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    /// Field name to value.
    #[serde(default)]
    pub values: HashMap<String, String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    /// When present, replaces every stored value.
    pub values: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub search: Option<String>,
    pub template_id: Option<DbId>,
    pub status: Option<DocumentStatus>,
    pub sort: Option<DocumentSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub data: Vec<DocumentListItem>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub stats: DocumentStats,
}

/// One template field with the document's value for it.
#[derive(Debug, Serialize)]
pub struct DocumentFieldEntry {
    pub field_id: DbId,
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub is_required: bool,
    pub placeholder_text: String,
    pub options: Vec<String>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub template_title: String,
    pub fields: Vec<DocumentFieldEntry>,
    pub rendered: RenderedContent,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map name-keyed input onto the template's fields.
///
/// Unknown names are rejected. Values are trimmed and blank ones are not
/// stored, so a required field left blank simply has no row.
fn collect_values(
    fields: &[TemplateField],
    values: &HashMap<String, String>,
) -> Result<Vec<FieldValueInput>, CoreError> {
    let mut unknown: Vec<&str> = values
        .keys()
        .filter(|name| !fields.iter().any(|f| &f.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(CoreError::Validation(format!(
            "Unknown fields for this template: {}",
            unknown.join(", ")
        )));
    }

    Ok(fields
        .iter()
        .filter_map(|f| {
            let value = values.get(&f.name).map(|v| v.trim()).unwrap_or_default();
            (!value.is_empty()).then(|| FieldValueInput {
                field_id: f.id,
                value: value.to_string(),
            })
        })
        .collect())
}

/// Refuse completion while a required field is blank.
fn check_completion(fields: &[TemplateField], values: &[FieldValueInput]) -> Result<(), CoreError> {
    validate_completion(fields.iter().filter(|f| f.is_required).map(|f| {
        let value = values
            .iter()
            .find(|v| v.field_id == f.id)
            .map(|v| v.value.as_str());
        (f.name.as_str(), value)
    }))
}

/// Load fields and values, and render the template content.
async fn build_detail(
    state: &AppState,
    document: Document,
    policy: UnfilledPolicy,
) -> AppResult<DocumentDetail> {
    let template = load_template(state, document.template_id).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, template.id).await?;
    let stored = DocumentFieldValueRepo::list_for_document(&state.pool, document.id).await?;

    let by_field: HashMap<DbId, &str> = stored
        .iter()
        .map(|v| (v.field_id, v.value.as_str()))
        .collect();
    let by_name: HashMap<String, String> = fields
        .iter()
        .filter_map(|f| by_field.get(&f.id).map(|v| (f.name.clone(), v.to_string())))
        .collect();

    let entries = fields
        .into_iter()
        .map(|f| DocumentFieldEntry {
            value: by_field.get(&f.id).map(|v| v.to_string()),
            options: parse_options(f.options.as_deref()),
            field_id: f.id,
            name: f.name,
            label: f.label,
            field_type: f.field_type,
            is_required: f.is_required,
            placeholder_text: f.placeholder_text,
        })
        .collect();

    Ok(DocumentDetail {
        rendered: render(&template.content, &by_name, policy),
        template_title: template.title,
        fields: entries,
        document,
    })
}

/// The document's template, regardless of its current visibility.
async fn load_template(state: &AppState, template_id: DbId) -> AppResult<Template> {
    TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or_else(|| template_not_found(template_id))
}

async fn find_document(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Document> {
    DocumentRepo::find_for_user(&state.pool, id, user_id)
        .await?
        .ok_or_else(|| document_not_found(id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/templates/{id}/documents
pub async fn create_from_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<DbId>,
    Json(input): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentDetail>>)> {
    let template = visible_template(&state, template_id, Some(auth.user_id)).await?;
    let title = validate_document_title(&input.title)?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, template.id).await?;
    let values = collect_values(&fields, &input.values)?;
    if input.is_completed {
        check_completion(&fields, &values)?;
    }

    let document = DocumentRepo::create(
        &state.pool,
        &CreateDocument {
            title,
            template_id: template.id,
            created_by: auth.user_id,
            is_completed: input.is_completed,
            values,
        },
    )
    .await?;

    tracing::info!(
        document_id = document.id,
        template_id,
        user_id = auth.user_id,
        "Document created",
    );

    let detail = build_detail(&state, document, UnfilledPolicy::default()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/documents
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DocumentListQuery>,
) -> AppResult<Json<DocumentListResponse>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let list_params = DocumentListParams {
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        template_id: params.template_id,
        status: params.status,
        sort: params.sort.unwrap_or_default(),
        limit,
        offset,
    };

    let data = DocumentRepo::list_for_user(&state.pool, auth.user_id, &list_params).await?;
    let total = DocumentRepo::count_for_user(&state.pool, auth.user_id, &list_params).await?;
    let stats = DocumentRepo::stats_for_user(&state.pool, auth.user_id).await?;

    Ok(Json(DocumentListResponse {
        data,
        total,
        limit,
        offset,
        stats,
    }))
}

/// GET /api/v1/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(render_params): Query<RenderParams>,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    let document = find_document(&state, id, auth.user_id).await?;
    let detail = build_detail(&state, document, render_params.unfilled).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/documents/{id}
///
/// A document that is (or becomes) completed must have every required
/// field filled, checked against the values after the update.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentRequest>,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    let document = find_document(&state, id, auth.user_id).await?;
    let title = input
        .title
        .as_deref()
        .map(validate_document_title)
        .transpose()?;

    let fields = TemplateFieldRepo::list_for_template(&state.pool, document.template_id).await?;
    let values = input
        .values
        .as_ref()
        .map(|v| collect_values(&fields, v))
        .transpose()?;

    let completed = input.is_completed.unwrap_or(document.is_completed);
    if completed {
        match values {
            Some(ref new_values) => check_completion(&fields, new_values)?,
            None => {
                let stored: Vec<FieldValueInput> =
                    DocumentFieldValueRepo::list_for_document(&state.pool, id)
                        .await?
                        .into_iter()
                        .map(|v| FieldValueInput {
                            field_id: v.field_id,
                            value: v.value,
                        })
                        .collect();
                check_completion(&fields, &stored)?;
            }
        }
    }

    let document = DocumentRepo::update(
        &state.pool,
        id,
        &UpdateDocument {
            title,
            is_completed: input.is_completed,
            values,
        },
    )
    .await?
    .ok_or_else(|| document_not_found(id))?;

    tracing::info!(document_id = id, user_id = auth.user_id, completed, "Document updated");

    let detail = build_detail(&state, document, UnfilledPolicy::default()).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/documents/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DocumentRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(document_not_found(id));
    }
    tracing::info!(document_id = id, user_id = auth.user_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/{id}/duplicate
///
/// The copy keeps every value and starts as a draft.
pub async fn duplicate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    let copy = DocumentRepo::duplicate(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| document_not_found(id))?;

    tracing::info!(
        document_id = id,
        copy_id = copy.id,
        user_id = auth.user_id,
        "Document duplicated",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}

/// GET /api/v1/documents/{id}/export/{format}
///
/// `format` is `html`, `pdf` or `docx`. A format compiled out of this build
/// answers 501.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, format)): Path<(DbId, String)>,
    Query(render_params): Query<RenderParams>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::parse(&format)?;
    let document = find_document(&state, id, auth.user_id).await?;
    let detail = build_detail(&state, document, render_params.unfilled).await?;

    let export = ExportDocument {
        title: detail.document.title.clone(),
        template_title: detail.template_title,
        body: detail.rendered.text,
        generated_at: Utc::now(),
    };
    let bytes = export_document(&export, format)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(&export.title, format)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::InternalError(format!("Invalid export filename: {e}")))?;

    tracing::info!(
        document_id = id,
        user_id = auth.user_id,
        format = format.as_str(),
        bytes = bytes.len(),
        "Document exported",
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(format.mime_type())),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
