//! Confluence integration for pagemap.
//!
//! Serves page titles, storage-format bodies, and paginated child listings
//! from the Confluence REST API through the
//! [`ContentSource`](pagemap_tree::ContentSource) contract.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use pagemap_confluence::ConfluenceClient;
//! use pagemap_tree::{BuildOptions, HierarchyBuilder, PageId};
//!
//! let client = ConfluenceClient::from_config(
//!     "https://wiki.example.com",
//!     Some("me@example.com"),
//!     "api-token",
//!     25,
//!     Duration::from_secs(30),
//! )?;
//! let report = HierarchyBuilder::new(&client, BuildOptions::default())
//!     .build(&PageId::from("123456"))?;
//! ```

mod client;
mod error;
mod source;
mod types;

pub use client::{ChildPages, ConfluenceClient, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use error::ConfluenceError;
pub use source::fetch_error_kind;
pub use types::{Body, ChildLinks, ChildPagesResponse, Links, Page, PageRef, Storage};
