//! Output backends for pagemap diagrams.
//!
//! Consumes a positioned [`LayoutGraph`](pagemap_layout::LayoutGraph) and
//! writes it out:
//! - [`SvgRenderer`]: standalone SVG document, one box per node
//! - [`to_json`] / [`write_json`]: the layout graph as JSON

mod error;
mod escape;
mod json;
mod svg;

pub use error::RenderError;
pub use escape::escape_xml;
pub use json::{to_json, write_json};
pub use svg::{PALETTE, SvgRenderer, depth_color};
