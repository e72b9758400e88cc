//! Domain logic for DocBuilder.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types and functions.

pub mod error;
pub mod export;
pub mod field_types;
pub mod pagination;
pub mod placeholders;
pub mod reconcile;
pub mod roles;
pub mod types;
pub mod validation;
