//! SVG rendering of layout graphs.
//!
//! Pages are filled rounded boxes colored by depth, sections are white note
//! boxes inside them, unresolved branches are dashed red boxes. Containment
//! edges between pages follow the routing hint; cross-references are dashed
//! elbows. Section containment is shown by nesting, not by edges.

use std::fmt;
use std::fs;
use std::path::Path;

use pagemap_layout::{LayoutConfig, LayoutEdge, LayoutGraph, LayoutNode, NodeKind, Routing};
use tracing::info;

use crate::error::RenderError;
use crate::escape::escape_xml;

/// Page fill colors by depth; deeper pages reuse the last one.
pub const PALETTE: [&str; 4] = ["#4285F4", "#34A853", "#FBBC05", "#EA4335"];

const MARGIN: f64 = 20.0;
const HEADER_HEIGHT: f64 = 40.0;
const TEXT_COLOR: &str = "#202124";
const EDGE_COLOR: &str = "#5F6368";
const UNRESOLVED_COLOR: &str = "#EA4335";

/// Fill color of a page at `depth`.
#[must_use]
pub fn depth_color(depth: usize) -> &'static str {
    PALETTE[depth.min(PALETTE.len() - 1)]
}

/// Renders a [`LayoutGraph`] as a standalone SVG document.
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    title: String,
    line_height: f64,
    padding: f64,
}

impl SvgRenderer {
    /// Create a renderer drawing `title` in the diagram header.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_layout(title, &LayoutConfig::default())
    }

    /// Create a renderer whose text placement matches `config`.
    #[must_use]
    pub fn with_layout(title: impl Into<String>, config: &LayoutConfig) -> Self {
        Self {
            title: title.into(),
            line_height: config.line_height,
            padding: config.padding,
        }
    }

    /// Render the graph to an SVG string.
    #[must_use]
    pub fn render(&self, graph: &LayoutGraph) -> String {
        SvgDocument {
            renderer: self,
            graph,
        }
        .to_string()
    }

    /// Render the graph and write it to `path`.
    pub fn write_svg(&self, graph: &LayoutGraph, path: &Path) -> Result<(), RenderError> {
        fs::write(path, self.render(graph)).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), nodes = graph.nodes.len(), "Wrote SVG diagram");
        Ok(())
    }

    fn font_size(&self) -> f64 {
        self.line_height * 0.75
    }

    /// Baseline of text line `line` inside a box starting at `top`.
    #[allow(clippy::cast_precision_loss)]
    fn baseline(&self, top: f64, line: usize) -> f64 {
        top + self.padding + self.line_height * (line as f64) + self.font_size()
    }
}

struct SvgDocument<'a> {
    renderer: &'a SvgRenderer,
    graph: &'a LayoutGraph,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = self.graph.bounds;
        let width = bounds.width + 2.0 * MARGIN;
        let height = bounds.height + HEADER_HEIGHT + 2.0 * MARGIN;
        let font_size = self.renderer.font_size();

        writeln!(
            f,
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.1}" height="{height:.1}" viewBox="0 0 {width:.1} {height:.1}" font-family="Helvetica, Arial, sans-serif" font-size="{font_size:.1}">"##
        )?;
        writeln!(f, "<title>{}</title>", escape_xml(&self.renderer.title))?;
        writeln!(
            f,
            r##"<text x="{MARGIN:.1}" y="{:.1}" font-size="{:.1}" font-weight="bold" fill="{TEXT_COLOR}">{}</text>"##,
            MARGIN + font_size * 1.5,
            font_size * 1.5,
            escape_xml(&self.renderer.title)
        )?;
        writeln!(
            f,
            r##"<g transform="translate({:.1} {:.1})">"##,
            MARGIN - bounds.x,
            MARGIN + HEADER_HEIGHT - bounds.y
        )?;

        for edge in &self.graph.edges {
            self.write_edge(f, edge, false)?;
        }
        for edge in &self.graph.cross_references {
            self.write_edge(f, edge, true)?;
        }
        for kind in [NodeKind::Page, NodeKind::Section, NodeKind::Unresolved] {
            for (_, node) in self.graph.nodes_of(kind) {
                self.write_node(f, node)?;
            }
        }

        writeln!(f, "</g>")?;
        writeln!(f, "</svg>")
    }
}

impl SvgDocument<'_> {
    fn write_edge(&self, f: &mut fmt::Formatter<'_>, edge: &LayoutEdge, dashed: bool) -> fmt::Result {
        let (Some(from), Some(to)) = (self.graph.node(&edge.from), self.graph.node(&edge.to)) else {
            return Ok(());
        };
        if to.kind == NodeKind::Section {
            return Ok(());
        }

        let (x1, y1) = (from.rect.center_x(), from.rect.bottom());
        let (x2, y2) = (to.rect.center_x(), to.rect.y);
        let path = match edge.routing {
            Routing::Straight => format!("M {x1:.1} {y1:.1} L {x2:.1} {y2:.1}"),
            Routing::Orthogonal => {
                let mid = (y1 + y2) / 2.0;
                format!("M {x1:.1} {y1:.1} V {mid:.1} H {x2:.1} V {y2:.1}")
            }
        };
        let dash = if dashed {
            r##" stroke-dasharray="6 4""##
        } else {
            ""
        };
        writeln!(
            f,
            r##"<path d="{path}" fill="none" stroke="{EDGE_COLOR}" stroke-width="1.5"{dash}/>"##
        )
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &LayoutNode) -> fmt::Result {
        let r = node.rect;
        let renderer = self.renderer;
        let center = r.center_x();
        writeln!(f, "<g>")?;
        writeln!(f, "<title>{}</title>", escape_xml(&node.tooltip))?;

        match node.kind {
            NodeKind::Page => {
                writeln!(
                    f,
                    r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="6" fill="{}" stroke="{EDGE_COLOR}"/>"##,
                    r.x,
                    r.y,
                    r.width,
                    r.height,
                    depth_color(node.depth)
                )?;
                writeln!(
                    f,
                    r##"<text x="{center:.1}" y="{:.1}" text-anchor="middle" font-weight="bold" fill="#FFFFFF">{}</text>"##,
                    renderer.baseline(r.y, 0),
                    escape_xml(&node.label)
                )?;
            }
            NodeKind::Section => {
                writeln!(
                    f,
                    r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="2" fill="#FFFFFF" fill-opacity="0.92" stroke="{}"/>"##,
                    r.x,
                    r.y,
                    r.width,
                    r.height,
                    depth_color(node.depth)
                )?;
                let x = r.x + renderer.padding;
                writeln!(
                    f,
                    r##"<text x="{x:.1}" y="{:.1}" font-weight="bold" fill="{TEXT_COLOR}">{}</text>"##,
                    renderer.baseline(r.y, 0),
                    escape_xml(&node.label)
                )?;
                for (n, line) in node.detail.iter().enumerate() {
                    writeln!(
                        f,
                        r##"<text x="{x:.1}" y="{:.1}" fill="{TEXT_COLOR}">{}</text>"##,
                        renderer.baseline(r.y, n + 1),
                        escape_xml(line)
                    )?;
                }
            }
            NodeKind::Unresolved => {
                writeln!(
                    f,
                    r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="6" fill="#FFFFFF" stroke="{UNRESOLVED_COLOR}" stroke-dasharray="4 3"/>"##,
                    r.x, r.y, r.width, r.height
                )?;
                writeln!(
                    f,
                    r##"<text x="{center:.1}" y="{:.1}" text-anchor="middle" fill="{UNRESOLVED_COLOR}">{}</text>"##,
                    r.center_y() + renderer.font_size() / 3.0,
                    escape_xml(&node.label)
                )?;
            }
        }

        writeln!(f, "</g>")
    }
}
