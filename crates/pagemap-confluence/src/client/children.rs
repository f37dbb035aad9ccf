//! Child page listing for Confluence API.

use std::collections::VecDeque;

use tracing::debug;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ChildPagesResponse, PageRef};

impl ConfluenceClient {
    /// Lazily list the child pages of a page in display order.
    ///
    /// No request is made until the iterator is advanced; each further batch
    /// is requested only once the previous one has been drained.
    #[must_use]
    pub fn child_pages(&self, page_id: &str) -> ChildPages<'_> {
        ChildPages {
            client: self,
            page_id: page_id.to_owned(),
            start: 0,
            batch: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Get one batch of child pages starting at offset `start`.
    pub fn get_child_batch(
        &self,
        page_id: &str,
        start: usize,
    ) -> Result<ChildPagesResponse, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/page?start={}&limit={}",
            self.api_url(),
            page_id,
            start,
            self.page_size
        );

        debug!("Listing children of page {} from {}", page_id, start);

        self.get_json(&url)
    }
}

/// Paginated child page listing.
///
/// Follows the server's `next` links, so a server that caps the batch size
/// below the requested one still yields every child. A failed request is
/// yielded once and ends the listing.
pub struct ChildPages<'a> {
    client: &'a ConfluenceClient,
    page_id: String,
    start: usize,
    batch: VecDeque<PageRef>,
    exhausted: bool,
}

impl ChildPages<'_> {
    /// Queue a fetched batch and advance the offset past it.
    fn accept(&mut self, response: ChildPagesResponse) {
        self.exhausted = !response.has_more();
        self.start += response.results.len();
        self.batch.extend(response.results);
    }
}

impl Iterator for ChildPages<'_> {
    type Item = Result<PageRef, ConfluenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch.is_empty() {
            if self.exhausted {
                return None;
            }
            match self.client.get_child_batch(&self.page_id, self.start) {
                Ok(response) => self.accept(response),
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
        self.batch.pop_front().map(Ok)
    }
}
