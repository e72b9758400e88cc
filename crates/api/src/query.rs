//! Shared query parameter types for API handlers.

use docbuilder_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use docbuilder_core::placeholders::UnfilledPolicy;
use serde::Deserialize;

/// Clamp raw `?limit=&offset=` values using the list page defaults.
///
/// List query structs carry `limit`/`offset` inline rather than through a
/// flattened struct; `serde_urlencoded` cannot parse numbers behind
/// `#[serde(flatten)]`.
pub fn resolve_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        clamp_offset(offset),
    )
}

/// `?unfilled=keep|marker` for endpoints that render document content.
#[derive(Debug, Default, Deserialize)]
pub struct RenderParams {
    #[serde(default)]
    pub unfilled: UnfilledPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        assert_eq!(resolve_page(None, None), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(resolve_page(Some(0), Some(-5)), (1, 0));
        assert_eq!(resolve_page(Some(10_000), Some(30)), (MAX_PAGE_SIZE, 30));
    }
}
