//! Page operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Page;

impl ConfluenceClient {
    /// Get page by ID with its storage-format body expanded.
    pub fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}?expand=body.storage", self.api_url(), page_id);

        info!("Getting page {}", page_id);

        self.get_json(&url)
    }
}
