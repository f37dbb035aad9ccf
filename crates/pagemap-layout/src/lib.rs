//! Diagram layout for page trees.
//!
//! Maps a completed [`PageNode`](pagemap_tree::PageNode) tree to positioned,
//! non-overlapping boxes in a [`LayoutGraph`]. Every page becomes a box with
//! its section outline nested inside; child pages are laid out in rows below
//! their parent, tree-diagram style.
//!
//! Layout is pure and deterministic: the same tree and [`LayoutConfig`]
//! always produce the same graph.
//!
//! # Example
//!
//! ```ignore
//! use pagemap_layout::{LayoutConfig, layout};
//!
//! let graph = layout(&report.root, &LayoutConfig::default());
//! println!("{} nodes", graph.nodes.len());
//! ```

mod config;
mod engine;
mod geometry;
mod graph;
mod outline;
mod text;

pub use config::LayoutConfig;
pub use engine::layout;
pub use geometry::LayoutRect;
pub use graph::{LayoutEdge, LayoutGraph, LayoutNode, NodeKind, Routing};
pub use text::{TextMetrics, UNTITLED_PAGE, UNTITLED_SECTION, truncate, wrap};
