//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row writes take a
//! transaction internally and commit before returning.

pub mod category_repo;
pub mod dashboard_repo;
pub mod document_field_value_repo;
pub mod document_repo;
pub mod refresh_token_repo;
pub mod template_field_repo;
pub mod template_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use dashboard_repo::DashboardRepo;
pub use document_field_value_repo::DocumentFieldValueRepo;
pub use document_repo::DocumentRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use template_field_repo::TemplateFieldRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;

/// `ILIKE` pattern matching `search` literally anywhere in the column.
/// Pair with `ESCAPE '\'` in the query.
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
