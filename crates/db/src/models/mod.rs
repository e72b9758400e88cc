//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod category;
pub mod dashboard;
pub mod document;
pub mod document_field_value;
pub mod refresh_token;
pub mod template;
pub mod template_field;
pub mod user;
