//! Child page listing types.

use serde::Deserialize;

/// Child page entry. Listings are requested without expansion, so only the
/// id and title are present.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRef {
    /// Page ID.
    pub id: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
}

/// One batch of a paginated child page listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildPagesResponse {
    /// Child pages in display order.
    pub results: Vec<PageRef>,
    /// Offset of the first result.
    #[serde(default)]
    pub start: usize,
    /// Batch size the server applied, which may be below the requested one.
    #[serde(default)]
    pub limit: usize,
    /// Number of results in this batch.
    #[serde(default)]
    pub size: usize,
    /// Pagination links.
    #[serde(rename = "_links", default)]
    pub links: ChildLinks,
}

/// Pagination links of a listing batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildLinks {
    /// Relative link to the next batch; absent on the last one.
    #[serde(default)]
    pub next: Option<String>,
}

impl ChildPagesResponse {
    /// Whether another batch follows this one.
    ///
    /// The server's `next` link decides; a batch shorter than requested is
    /// not the end when the server capped the limit. An empty batch always
    /// ends the listing.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.links.next.is_some() && !self.results.is_empty()
    }
}
