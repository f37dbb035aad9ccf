//! [`ContentSource`] implementation over the REST client.

use pagemap_tree::{
    ChildIds, ContentFormat, ContentSource, FetchError, FetchErrorKind, FetchOperation,
    PageContent, PageId,
};

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;

/// Classify a client error.
///
/// 404 is `NotFound`, 401/403 `PermissionDenied`, 429, 5xx and transport
/// failures `Unavailable`; everything else is `Other`.
#[must_use]
pub fn fetch_error_kind(err: &ConfluenceError) -> FetchErrorKind {
    match err {
        ConfluenceError::HttpResponse { status, .. } => match status {
            404 => FetchErrorKind::NotFound,
            401 | 403 => FetchErrorKind::PermissionDenied,
            429 | 500..=599 => FetchErrorKind::Unavailable,
            _ => FetchErrorKind::Other,
        },
        ConfluenceError::HttpRequest(_) => FetchErrorKind::Unavailable,
        _ => FetchErrorKind::Other,
    }
}

fn to_fetch_error(id: &PageId, operation: FetchOperation, err: &ConfluenceError) -> FetchError {
    FetchError::new(id.clone(), operation, fetch_error_kind(err), err.to_string())
}

impl ContentSource for ConfluenceClient {
    fn fetch_page(&self, id: &PageId) -> Result<PageContent, FetchError> {
        let page = self
            .get_page(id.as_str())
            .map_err(|err| to_fetch_error(id, FetchOperation::Page, &err))?;
        let body = page.storage_value().ok_or_else(|| {
            to_fetch_error(
                id,
                FetchOperation::Page,
                &ConfluenceError::MissingBody(page.id.clone()),
            )
        })?;

        Ok(PageContent {
            title: page.title.clone(),
            body: body.to_owned(),
            format: ContentFormat::Storage,
        })
    }

    fn list_children<'a>(&'a self, id: &PageId) -> ChildIds<'a> {
        let parent = id.clone();
        Box::new(self.child_pages(id.as_str()).map(move |child| {
            child
                .map(|page| PageId::new(page.id))
                .map_err(|err| to_fetch_error(&parent, FetchOperation::Children, &err))
        }))
    }
}
