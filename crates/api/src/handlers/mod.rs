//! Request handlers, one module per resource.
//!
//! Handlers validate input with `docbuilder_core`, delegate persistence to
//! the repositories in `docbuilder_db` and map failures via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod documents;
pub mod template_fields;
pub mod templates;
