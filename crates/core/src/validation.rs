//! Input validation for templates, fields, documents, categories and
//! account signup. All functions return [`CoreError::Validation`] with a
//! user-facing message on failure.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::field_types::{parse_options, FieldType};
use crate::placeholders::{extract_field_names, find_invalid_placeholders, is_valid_field_name};

pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 200;
pub const MIN_CONTENT_LEN: usize = 10;
pub const MAX_FIELD_NAME_LEN: usize = 100;
pub const MAX_LABEL_LEN: usize = 200;
pub const MAX_PLACEHOLDER_TEXT_LEN: usize = 200;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;
/// Upper bound for a field's explicit position. Auto-assigned positions
/// step by 10 past the largest one, so this keeps them within `INTEGER`.
pub const MAX_SORT_ORDER: i32 = 1_000_000;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 150;

/// Colour assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

fn validate_title(what: &str, title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation(format!("{what} title is required")));
    }
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "{what} title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    if len > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "{what} title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// Validate and trim a template title.
pub fn validate_template_title(title: &str) -> Result<String, CoreError> {
    validate_title("Template", title)
}

/// Validate and trim a document title.
pub fn validate_document_title(title: &str) -> Result<String, CoreError> {
    validate_title("Document", title)
}

/// Validate and trim template content, including placeholder syntax.
pub fn validate_template_content(content: &str) -> Result<String, CoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CoreError::Validation(
            "Template content is required".to_string(),
        ));
    }
    if content.chars().count() < MIN_CONTENT_LEN {
        return Err(CoreError::Validation(format!(
            "Template content must be at least {MIN_CONTENT_LEN} characters"
        )));
    }
    let invalid = find_invalid_placeholders(content);
    if !invalid.is_empty() {
        return Err(CoreError::Validation(format!(
            "Invalid field names: {}. Names must start with a letter or underscore \
             and contain only letters, digits and underscores",
            invalid.join(", ")
        )));
    }
    let too_long: Vec<String> = extract_field_names(content)
        .into_iter()
        .filter(|name| name.len() > MAX_FIELD_NAME_LEN)
        .collect();
    if !too_long.is_empty() {
        return Err(CoreError::Validation(format!(
            "Field names must be at most {MAX_FIELD_NAME_LEN} characters: {}",
            too_long.join(", ")
        )));
    }
    Ok(content.to_string())
}

/// Explicit field positions must lie in `0..=MAX_SORT_ORDER`.
pub fn validate_sort_order(sort_order: i32) -> Result<(), CoreError> {
    if !(0..=MAX_SORT_ORDER).contains(&sort_order) {
        return Err(CoreError::Validation(format!(
            "Sort order must be between 0 and {MAX_SORT_ORDER}"
        )));
    }
    Ok(())
}

/// Validate a template field definition.
pub fn validate_field_definition(
    name: &str,
    label: &str,
    field_type: FieldType,
    options: Option<&str>,
    placeholder_text: Option<&str>,
) -> Result<(), CoreError> {
    if !is_valid_field_name(name) {
        return Err(CoreError::Validation(format!(
            "Invalid field name '{name}'. Must start with a letter or underscore \
             and contain only letters, digits and underscores"
        )));
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Field name must be at most {MAX_FIELD_NAME_LEN} characters"
        )));
    }
    if label.trim().is_empty() {
        return Err(CoreError::Validation("Field label is required".to_string()));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(CoreError::Validation(format!(
            "Field label must be at most {MAX_LABEL_LEN} characters"
        )));
    }
    if placeholder_text.is_some_and(|t| t.chars().count() > MAX_PLACEHOLDER_TEXT_LEN) {
        return Err(CoreError::Validation(format!(
            "Help text must be at most {MAX_PLACEHOLDER_TEXT_LEN} characters"
        )));
    }
    if field_type == FieldType::Select && parse_options(options).is_empty() {
        return Err(CoreError::Validation(
            "Options are required for select fields".to_string(),
        ));
    }
    Ok(())
}

/// Validate and trim a category name.
pub fn validate_category_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Category name is required".to_string()));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Category name must be at most {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate that a colour string is `#RRGGBB`.
pub fn validate_hex_color(color: &str) -> Result<(), CoreError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB hex format"
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username may contain only letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Reject completion while any required field lacks a non-blank value.
///
/// `required` yields `(field_name, value)` for each required field.
pub fn validate_completion<'a, I>(required: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let missing: Vec<&str> = required
        .into_iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Cannot complete document, required fields are empty: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}
