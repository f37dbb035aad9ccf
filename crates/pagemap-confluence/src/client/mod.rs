//! Confluence REST API client.
//!
//! Provides sync HTTP client for Confluence REST API with basic (user + API
//! token) or bearer (personal access token) authentication.

mod children;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::error::ConfluenceError;

pub use children::ChildPages;

/// Default number of child pages requested per listing batch.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Largest listing batch the API serves.
pub const MAX_PAGE_SIZE: usize = 200;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
    page_size: usize,
}

impl ConfluenceClient {
    /// Create client from config values.
    ///
    /// # Arguments
    /// * `base_url` - Confluence server base URL
    /// * `username` - Account name for basic auth; `None` sends `api_token`
    ///   as a bearer token
    /// * `api_token` - API token or personal access token
    /// * `page_size` - Child listing batch size (1 to [`MAX_PAGE_SIZE`])
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Config`] if the URL or page size is unusable.
    pub fn from_config(
        base_url: &str,
        username: Option<&str>,
        api_token: &str,
        page_size: usize,
        timeout: Duration,
    ) -> Result<Self, ConfluenceError> {
        let base_url = base_url.trim_end_matches('/');
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfluenceError::Config(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfluenceError::Config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            base_url: base_url.to_owned(),
            auth_header: auth_header(username, api_token),
            page_size,
        })
    }

    /// Child listing batch size.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// GET `url` and decode the JSON response.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let text = body_reader.read_to_string()?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// `Authorization` header value for the configured credentials.
fn auth_header(username: Option<&str>, api_token: &str) -> String {
    match username.filter(|name| !name.is_empty()) {
        Some(username) => {
            let credentials = BASE64_STANDARD.encode(format!("{username}:{api_token}"));
            format!("Basic {credentials}")
        }
        None => format!("Bearer {api_token}"),
    }
}
