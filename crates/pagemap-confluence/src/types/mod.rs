//! Confluence API types.

mod children;
mod page;

pub use children::{ChildLinks, ChildPagesResponse, PageRef};
pub use page::{Body, Links, Page, Storage};
