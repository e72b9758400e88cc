//! Handlers for `/templates/{id}/fields`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use docbuilder_core::error::CoreError;
use docbuilder_core::field_types::{humanize_label, infer_field_type, FieldType};
use docbuilder_core::types::DbId;
use docbuilder_core::validation::{validate_field_definition, validate_sort_order};
use docbuilder_db::models::template_field::{
    CreateTemplateField, FieldSyncResult, TemplateField, UpdateTemplateField,
};
use docbuilder_db::repositories::TemplateFieldRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::templates::{owned_template, visible_template};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

fn field_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TemplateField",
        id,
    })
}

/// Body of `POST /templates/{id}/fields`. Only `name` is required; the
/// rest is derived from the name the same way detection does.
#[derive(Debug, Deserialize)]
pub struct CreateFieldRequest {
    pub name: String,
    pub label: Option<String>,
    pub field_type: Option<String>,
    pub is_required: Option<bool>,
    pub placeholder_text: Option<String>,
    pub options: Option<String>,
    pub sort_order: Option<i32>,
}

fn parse_field_type(raw: &str) -> Result<FieldType, CoreError> {
    FieldType::parse(raw).map_err(CoreError::Validation)
}

/// GET /api/v1/templates/{id}/fields
pub async fn list(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TemplateField>>>> {
    visible_template(&state, template_id, caller.user_id()).await?;
    let fields = TemplateFieldRepo::list_for_template(&state.pool, template_id).await?;
    Ok(Json(DataResponse { data: fields }))
}

/// POST /api/v1/templates/{id}/fields
///
/// A field whose name is not used in the content is allowed; the next
/// detection run removes it unless a placeholder is added.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<DbId>,
    Json(input): Json<CreateFieldRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TemplateField>>)> {
    owned_template(&state, template_id, auth.user_id).await?;

    let name = input.name.trim().to_string();
    let field_type = match input.field_type.as_deref() {
        Some(raw) => parse_field_type(raw)?,
        None => infer_field_type(&name),
    };
    let label = input
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| humanize_label(&name));
    let placeholder_text = input.placeholder_text.unwrap_or_default();

    validate_field_definition(
        &name,
        &label,
        field_type,
        input.options.as_deref(),
        Some(&placeholder_text),
    )?;

    let sort_order = match input.sort_order {
        Some(order) => {
            validate_sort_order(order)?;
            order
        }
        None => TemplateFieldRepo::next_sort_order(&state.pool, template_id).await?,
    };

    let field = TemplateFieldRepo::create(
        &state.pool,
        template_id,
        &CreateTemplateField {
            name,
            label,
            field_type: field_type.as_str().to_string(),
            is_required: input.is_required.unwrap_or(false),
            placeholder_text,
            options: input.options,
            sort_order,
        },
    )
    .await?;

    tracing::info!(
        template_id,
        field_id = field.id,
        user_id = auth.user_id,
        "Template field created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: field })))
}

/// POST /api/v1/templates/{id}/fields/detect
///
/// Reconcile the fields with the placeholders currently in the content.
pub async fn detect(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<DataResponse<FieldSyncResult>>> {
    let template = owned_template(&state, template_id, auth.user_id).await?;
    let result =
        TemplateFieldRepo::sync_with_content(&state.pool, template_id, &template.content).await?;

    tracing::info!(
        template_id,
        user_id = auth.user_id,
        created = result.created.len(),
        deleted = result.deleted.len(),
        "Field detection run",
    );
    Ok(Json(DataResponse { data: result }))
}

/// PUT /api/v1/templates/{id}/fields/{field_id}
///
/// The merged field is validated as a whole, so switching to `select`
/// requires options to be present after the update.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((template_id, field_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTemplateField>,
) -> AppResult<Json<DataResponse<TemplateField>>> {
    owned_template(&state, template_id, auth.user_id).await?;
    let existing = TemplateFieldRepo::find(&state.pool, template_id, field_id)
        .await?
        .ok_or_else(|| field_not_found(field_id))?;

    let field_type = parse_field_type(input.field_type.as_deref().unwrap_or(&existing.field_type))?;
    let label = input
        .label
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.label)
        .to_string();
    let options = input.options.as_deref().or(existing.options.as_deref());
    let placeholder_text = input
        .placeholder_text
        .as_deref()
        .unwrap_or(&existing.placeholder_text);

    validate_field_definition(
        &existing.name,
        &label,
        field_type,
        options,
        Some(placeholder_text),
    )?;
    if let Some(order) = input.sort_order {
        validate_sort_order(order)?;
    }

    let input = UpdateTemplateField {
        label: Some(label),
        field_type: Some(field_type.as_str().to_string()),
        ..input
    };
    let field = TemplateFieldRepo::update(&state.pool, template_id, field_id, &input)
        .await?
        .ok_or_else(|| field_not_found(field_id))?;

    tracing::info!(template_id, field_id, user_id = auth.user_id, "Template field updated");
    Ok(Json(DataResponse { data: field }))
}

/// DELETE /api/v1/templates/{id}/fields/{field_id}
///
/// Values stored for the field in existing documents are deleted too.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((template_id, field_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_template(&state, template_id, auth.user_id).await?;
    if !TemplateFieldRepo::delete(&state.pool, template_id, field_id).await? {
        return Err(field_not_found(field_id));
    }
    tracing::info!(template_id, field_id, user_id = auth.user_id, "Template field deleted");
    Ok(StatusCode::NO_CONTENT)
}
