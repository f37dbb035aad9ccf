//! Content-service contract.

use std::fmt;

use pagemap_outline::ContentFormat;
use serde::Serialize;

use crate::node::PageId;

/// Page title and raw content as served by the content service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContent {
    /// Page title.
    pub title: String,
    /// Raw page body.
    pub body: String,
    /// Format of `body`.
    pub format: ContentFormat,
}

/// Lazily produced child ids of one page.
///
/// Implementations may fetch further batches as the iterator advances. The
/// sequence is finite and not restartable; an `Err` item ends the listing.
pub type ChildIds<'a> = Box<dyn Iterator<Item = Result<PageId, FetchError>> + 'a>;

/// Remote content service holding the pages of a space.
pub trait ContentSource: Send + Sync {
    /// Fetch title and content of a page.
    fn fetch_page(&self, id: &PageId) -> Result<PageContent, FetchError>;

    /// List the child page ids of a page in display order.
    fn list_children<'a>(&'a self, id: &PageId) -> ChildIds<'a>;
}

/// Remote operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOperation {
    /// Fetching a page's title and content.
    Page,
    /// Listing a page's children.
    Children,
}

impl fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "fetch page",
            Self::Children => "list children of page",
        })
    }
}

/// Failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FetchErrorKind {
    /// Page does not exist.
    NotFound,
    /// Credentials lack access to the page.
    PermissionDenied,
    /// Service unreachable, rate limited, or failing.
    Unavailable,
    /// Page lies deeper than the traversal depth bound.
    DepthExceeded,
    /// Any other failure (malformed response, unexpected status).
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::Unavailable => "unavailable",
            Self::DepthExceeded => "depth exceeded",
            Self::Other => "error",
        })
    }
}

/// Page or child listing could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("failed to {operation} {id} ({kind}): {cause}")]
pub struct FetchError {
    /// Page the operation was about.
    pub id: PageId,
    /// Operation that failed.
    pub operation: FetchOperation,
    /// Failure category.
    #[serde(rename = "error")]
    pub kind: FetchErrorKind,
    /// Underlying cause, rendered as text.
    pub cause: String,
}

impl FetchError {
    /// Create a fetch error.
    #[must_use]
    pub fn new(
        id: PageId,
        operation: FetchOperation,
        kind: FetchErrorKind,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            id,
            operation,
            kind,
            cause: cause.into(),
        }
    }

    /// Page fetch failure.
    #[must_use]
    pub fn page(id: PageId, kind: FetchErrorKind, cause: impl Into<String>) -> Self {
        Self::new(id, FetchOperation::Page, kind, cause)
    }

    /// Child listing failure.
    #[must_use]
    pub fn children(id: PageId, kind: FetchErrorKind, cause: impl Into<String>) -> Self {
        Self::new(id, FetchOperation::Children, kind, cause)
    }

    /// Page skipped because it lies below the depth bound.
    #[must_use]
    pub fn depth_exceeded(id: PageId, max_depth: usize) -> Self {
        Self::page(
            id,
            FetchErrorKind::DepthExceeded,
            format!("deeper than {max_depth} levels"),
        )
    }
}
