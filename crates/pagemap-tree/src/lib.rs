//! Page hierarchy for pagemap.
//!
//! Reconstructs the page tree of a documentation space from per-page child
//! listings served by a [`ContentSource`].
//!
//! # Architecture
//!
//! The crate provides:
//! - [`PageNode`] / [`Child`]: the owned page tree, one node per page id
//! - [`ContentSource`]: the content-service contract (page fetch + lazy,
//!   paginated child listing)
//! - [`HierarchyBuilder`]: explicit-stack traversal with cycle detection,
//!   cross-reference recording, depth bound, and per-branch failure isolation
//! - [`MockSource`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use pagemap_tree::{BuildOptions, HierarchyBuilder, PageId};
//!
//! let builder = HierarchyBuilder::new(&client, BuildOptions::default());
//! let report = builder.build(&PageId::from("123456"))?;
//! for diagnostic in &report.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! ```

mod abort;
mod builder;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod node;
mod source;

pub use abort::AbortSignal;
pub use builder::{
    BuildError, BuildOptions, BuildReport, BuildStats, CycleError, DEFAULT_MAX_DEPTH, Diagnostic,
    HierarchyBuilder,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSource;
pub use node::{Child, PageId, PageNode};
pub use pagemap_outline::{ContentFormat, Section};
pub use source::{
    ChildIds, ContentSource, FetchError, FetchErrorKind, FetchOperation, PageContent,
};
