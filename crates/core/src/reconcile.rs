//! Diffing a template's placeholders against its stored field rows.
//!
//! The planner is pure; the database layer applies a [`FieldSyncPlan`]
//! inside one transaction.

use std::collections::HashSet;

use serde::Serialize;

use crate::field_types::{humanize_label, infer_field_type, is_required_by_default, FieldType};
use crate::placeholders::extract_field_names;

/// Spacing between auto-assigned `sort_order` values.
pub const SORT_ORDER_STEP: i32 = 10;

/// A field to be created by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub placeholder_text: String,
    pub sort_order: i32,
}

/// Result of [`plan_field_sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSyncPlan {
    pub to_create: Vec<NewField>,
    /// Existing field names no longer referenced by the content.
    pub to_delete: Vec<String>,
}

impl FieldSyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Build the default definition for a field detected in content.
///
/// `position` is the index of the name within the sorted extraction.
pub fn detected_field(name: &str, position: usize) -> NewField {
    let label = humanize_label(name);
    NewField {
        name: name.to_string(),
        placeholder_text: format!("Enter {}", label.to_lowercase()),
        label,
        field_type: infer_field_type(name),
        is_required: is_required_by_default(name),
        sort_order: i32::try_from(position)
            .unwrap_or(i32::MAX / SORT_ORDER_STEP)
            .saturating_mul(SORT_ORDER_STEP),
    }
}

/// Compute which fields to create and which to delete so that the stored
/// field set matches the placeholders in `content`.
///
/// Existing fields that are still referenced are left untouched.
pub fn plan_field_sync<S: AsRef<str>>(content: &str, existing_names: &[S]) -> FieldSyncPlan {
    let detected = extract_field_names(content);
    let existing: HashSet<&str> = existing_names.iter().map(AsRef::as_ref).collect();
    let detected_set: HashSet<&str> = detected.iter().map(String::as_str).collect();

    let to_create = detected
        .iter()
        .enumerate()
        .filter(|(_, name)| !existing.contains(name.as_str()))
        .map(|(i, name)| detected_field(name, i))
        .collect();

    let mut to_delete: Vec<String> = existing_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !detected_set.contains(name))
        .map(str::to_string)
        .collect();
    to_delete.sort();
    to_delete.dedup();

    FieldSyncPlan {
        to_create,
        to_delete,
    }
}
