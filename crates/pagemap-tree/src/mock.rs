//! Mock content source for testing.
//!
//! Provides [`MockSource`] for exercising the builder without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use pagemap_outline::ContentFormat;

use crate::node::PageId;
use crate::source::{ChildIds, ContentSource, FetchError, FetchErrorKind, PageContent};

/// Default number of child ids served per listing batch.
const DEFAULT_PAGE_SIZE: usize = 25;

/// In-memory content source.
///
/// Serves pages and child listings configured through the builder methods.
/// Child listings are paginated lazily, so tests can observe how many
/// batches the traversal actually requested.
///
/// # Example
///
/// ```ignore
/// use pagemap_tree::{ContentSource, MockSource, PageId};
///
/// let source = MockSource::new()
///     .with_page("1", "Home", "# Welcome")
///     .with_page("2", "Guide", "")
///     .with_children("1", &["2"]);
///
/// let home = source.fetch_page(&PageId::from("1")).unwrap();
/// ```
#[derive(Debug)]
pub struct MockSource {
    pages: HashMap<PageId, PageContent>,
    children: HashMap<PageId, Vec<PageId>>,
    page_failures: HashMap<PageId, FetchErrorKind>,
    children_failures: HashMap<PageId, (usize, FetchErrorKind)>,
    page_size: usize,
    page_fetches: AtomicUsize,
    batch_requests: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            children: HashMap::new(),
            page_failures: HashMap::new(),
            children_failures: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page_fetches: AtomicUsize::new(0),
            batch_requests: AtomicUsize::new(0),
        }
    }
}

impl MockSource {
    /// Create an empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with Markdown content.
    #[must_use]
    pub fn with_page(self, id: &str, title: &str, body: &str) -> Self {
        self.with_content(id, title, body, ContentFormat::Markdown)
    }

    /// Add a page with storage-format content.
    #[must_use]
    pub fn with_storage_page(self, id: &str, title: &str, body: &str) -> Self {
        self.with_content(id, title, body, ContentFormat::Storage)
    }

    fn with_content(mut self, id: &str, title: &str, body: &str, format: ContentFormat) -> Self {
        self.pages.insert(
            PageId::from(id),
            PageContent {
                title: title.to_owned(),
                body: body.to_owned(),
                format,
            },
        );
        self
    }

    /// Set the ordered child ids of a page.
    #[must_use]
    pub fn with_children(mut self, id: &str, children: &[&str]) -> Self {
        self.children.insert(
            PageId::from(id),
            children.iter().copied().map(PageId::from).collect(),
        );
        self
    }

    /// Make fetching a page fail with the given kind.
    #[must_use]
    pub fn failing_page(mut self, id: &str, kind: FetchErrorKind) -> Self {
        self.page_failures.insert(PageId::from(id), kind);
        self
    }

    /// Make a child listing fail after yielding `after` ids.
    #[must_use]
    pub fn failing_children_after(mut self, id: &str, after: usize, kind: FetchErrorKind) -> Self {
        self.children_failures
            .insert(PageId::from(id), (after, kind));
        self
    }

    /// Set the number of child ids served per batch (at least 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of `fetch_page` calls so far.
    #[must_use]
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    /// Number of child listing batches requested so far.
    #[must_use]
    pub fn batch_requests(&self) -> usize {
        self.batch_requests.load(Ordering::SeqCst)
    }
}

impl ContentSource for MockSource {
    fn fetch_page(&self, id: &PageId) -> Result<PageContent, FetchError> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(&kind) = self.page_failures.get(id) {
            return Err(FetchError::page(id.clone(), kind, "injected failure"));
        }
        self.pages
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::page(id.clone(), FetchErrorKind::NotFound, "HTTP 404"))
    }

    fn list_children<'a>(&'a self, id: &PageId) -> ChildIds<'a> {
        Box::new(MockChildren {
            source: self,
            parent: id.clone(),
            ids: self
                .children
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            failure: self.children_failures.get(id).copied(),
            start: 0,
            batch: VecDeque::new(),
            exhausted: false,
        })
    }
}

/// Lazily paginated child listing over a [`MockSource`].
struct MockChildren<'a> {
    source: &'a MockSource,
    parent: PageId,
    ids: &'a [PageId],
    failure: Option<(usize, FetchErrorKind)>,
    start: usize,
    batch: VecDeque<PageId>,
    exhausted: bool,
}

impl MockChildren<'_> {
    fn fetch_batch(&mut self) {
        self.source.batch_requests.fetch_add(1, Ordering::SeqCst);
        let end = (self.start + self.source.page_size).min(self.ids.len());
        self.batch.extend(self.ids[self.start..end].iter().cloned());
        if end - self.start < self.source.page_size {
            self.exhausted = true;
        }
        self.start = end;
    }
}

impl Iterator for MockChildren<'_> {
    type Item = Result<PageId, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let served = self.start - self.batch.len();
        if let Some((after, kind)) = self.failure
            && served == after
        {
            self.failure = None;
            self.exhausted = true;
            self.batch.clear();
            return Some(Err(FetchError::children(
                self.parent.clone(),
                kind,
                "injected failure",
            )));
        }
        if self.batch.is_empty() && !self.exhausted {
            self.fetch_batch();
        }
        self.batch.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn collect(source: &MockSource, id: &str) -> Vec<Result<PageId, FetchError>> {
        source.list_children(&PageId::from(id)).collect()
    }

    #[test]
    fn test_fetch_known_page() {
        let source = MockSource::new().with_page("1", "Home", "# Hi");

        let page = source.fetch_page(&PageId::from("1")).unwrap();

        assert_eq!(page.title, "Home");
        assert_eq!(page.format, ContentFormat::Markdown);
        assert_eq!(source.page_fetches(), 1);
    }

    #[test]
    fn test_fetch_unknown_page_is_not_found() {
        let source = MockSource::new();

        let err = source.fetch_page(&PageId::from("404")).unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::NotFound);
    }

    #[test]
    fn test_children_are_paginated_lazily() {
        let source = MockSource::new()
            .with_children("1", &["a", "b", "c", "d", "e"])
            .with_page_size(2);
        let mut children = source.list_children(&PageId::from("1"));

        assert_eq!(source.batch_requests(), 0);
        assert_eq!(children.next(), Some(Ok(PageId::from("a"))));
        assert_eq!(source.batch_requests(), 1);
        assert_eq!(children.next(), Some(Ok(PageId::from("b"))));
        assert_eq!(source.batch_requests(), 1);
        assert_eq!(children.next(), Some(Ok(PageId::from("c"))));
        assert_eq!(source.batch_requests(), 2);
        assert_eq!(children.count(), 2);
        assert_eq!(source.batch_requests(), 3);
    }

    #[test]
    fn test_full_last_batch_needs_one_more_request() {
        let source = MockSource::new()
            .with_children("1", &["a", "b"])
            .with_page_size(2);

        assert_eq!(collect(&source, "1").len(), 2);
        assert_eq!(source.batch_requests(), 2);
    }

    #[test]
    fn test_listing_failure_after_some_ids() {
        let source = MockSource::new()
            .with_children("1", &["a", "b", "c"])
            .failing_children_after("1", 1, FetchErrorKind::Unavailable);

        let items = collect(&source, "1");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(PageId::from("a")));
        assert_eq!(
            items[1].as_ref().map_err(|e| e.kind),
            Err(FetchErrorKind::Unavailable)
        );
    }

    #[test]
    fn test_page_without_children_lists_nothing() {
        let source = MockSource::new().with_page("1", "Leaf", "");

        assert!(collect(&source, "1").is_empty());
    }
}
