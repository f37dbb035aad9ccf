//! Section outlines for wiki page content.
//!
//! Splits raw page content into a nested outline of [`Section`]s keyed by
//! heading level (H1 to H4). Content is first tokenized into a flat sequence
//! of [`Block`]s, then folded into the outline by [`chunk_blocks`].
//!
//! Two content formats are supported:
//! - Markdown, tokenized with `pulldown-cmark` ([`chunk`])
//! - Confluence storage format (XHTML), tokenized with `quick-xml`
//!   ([`chunk_storage`])
//!
//! # Example
//!
//! ```
//! use pagemap_outline::chunk;
//!
//! let outline = chunk("# A\ntext1\n## B\ntext2\n# C\ntext3");
//! assert_eq!(outline.len(), 2);
//! assert_eq!(outline[0].heading, "A");
//! assert_eq!(outline[0].subsections[0].body, "text2");
//! ```

mod block;
mod chunker;
mod entities;
mod markdown;
mod section;
mod storage;

pub use block::Block;
pub use chunker::{chunk, chunk_blocks, chunk_content, chunk_storage};
pub use section::{MAX_LEVEL, Section};

/// Representation of raw page content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ContentFormat {
    /// `CommonMark` with GFM extensions.
    #[default]
    Markdown,
    /// Confluence storage format (XHTML with `ac:`/`ri:` elements).
    Storage,
}

/// Tokenize content into blocks without building the outline.
#[must_use]
pub fn tokenize(content: &str, format: ContentFormat) -> Vec<Block> {
    match format {
        ContentFormat::Markdown => markdown::tokenize(content),
        ContentFormat::Storage => storage::tokenize(content),
    }
}
