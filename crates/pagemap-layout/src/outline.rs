//! Section outline inside a page box.
//!
//! Sections stack vertically; each section box holds its heading line, its
//! excerpt lines, and below them its subsections indented by
//! [`LayoutConfig::indent`]. Sizes are measured bottom-up once, then boxes
//! are placed top-down at the width the page box grants.

use pagemap_tree::Section;

use crate::config::LayoutConfig;
use crate::geometry::LayoutRect;
use crate::graph::{LayoutGraph, LayoutNode, NodeIds, NodeKind, Routing};
use crate::text::{UNTITLED_SECTION, section_label, wrap};

/// Measured section with its measured subsections.
#[derive(Clone, Debug)]
pub(crate) struct SectionBlock {
    label: String,
    tooltip: String,
    excerpt: Vec<String>,
    /// Smallest width that fits the text and every nested box.
    width: f64,
    /// Height of the heading and excerpt area.
    head_height: f64,
    height: f64,
    subsections: Vec<SectionBlock>,
}

impl SectionBlock {
    fn measure(section: &Section, config: &LayoutConfig) -> Self {
        let metrics = config.metrics();
        let label = section_label(&section.heading, config.max_label_chars);
        let excerpt = wrap(&section.body, config.max_label_chars, config.excerpt_lines);
        let subsections = measure_all(&section.subsections, config);

        let text_width = metrics.max_width(
            std::iter::once(label.as_str()).chain(excerpt.iter().map(String::as_str)),
        );
        let mut width = text_width + 2.0 * config.padding;
        let head_height = metrics.height(1 + excerpt.len()) + 2.0 * config.padding;
        let mut height = head_height;
        if !subsections.is_empty() {
            let nested_width = subsections.iter().map(|s| s.width).fold(0.0, f64::max);
            width = width.max(config.indent + nested_width + config.padding);
            height += stacked_height(&subsections, config) + config.padding;
        }

        Self {
            label,
            tooltip: tooltip(section),
            excerpt,
            width,
            head_height,
            height,
            subsections,
        }
    }

    /// Place this section at `rect`, then its subsections inside it.
    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        graph: &mut LayoutGraph,
        ids: &mut NodeIds,
        parent: &str,
        id: &str,
        rect: LayoutRect,
        depth: usize,
        config: &LayoutConfig,
    ) {
        graph.insert(
            id.to_owned(),
            LayoutNode {
                kind: NodeKind::Section,
                rect,
                label: self.label.clone(),
                detail: self.excerpt.clone(),
                tooltip: self.tooltip.clone(),
                depth,
            },
        );
        graph.connect(parent, id, Routing::Straight);

        let mut y = rect.y + self.head_height;
        let nested_x = rect.x + config.indent;
        let nested_width = rect.width - config.indent - config.padding;
        for (n, sub) in self.subsections.iter().enumerate() {
            let sub_rect = LayoutRect::new(nested_x, y, nested_width, sub.height);
            let sub_id = ids.claim(format!("{id}.{}", n + 1));
            sub.place(graph, ids, id, &sub_id, sub_rect, depth, config);
            y += sub.height + config.section_gap;
        }
    }
}

/// Measured top-level outline of one page.
#[derive(Clone, Debug)]
pub(crate) struct OutlineBlock {
    sections: Vec<SectionBlock>,
    /// Smallest width that fits every section box.
    pub(crate) width: f64,
    /// Height of the stacked sections, excluding outer padding.
    pub(crate) height: f64,
}

impl OutlineBlock {
    pub(crate) fn measure(outline: &[Section], config: &LayoutConfig) -> Self {
        let sections = measure_all(outline, config);
        let width = sections.iter().map(|s| s.width).fold(0.0, f64::max);
        let height = stacked_height(&sections, config);
        Self {
            sections,
            width,
            height,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Place the outline in `area`, emitting `{page}#{n}` section nodes.
    pub(crate) fn place(
        &self,
        graph: &mut LayoutGraph,
        ids: &mut NodeIds,
        page: &str,
        area: LayoutRect,
        depth: usize,
        config: &LayoutConfig,
    ) {
        let mut y = area.y;
        for (n, section) in self.sections.iter().enumerate() {
            let rect = LayoutRect::new(area.x, y, area.width, section.height);
            let id = ids.claim(format!("{page}#{}", n + 1));
            section.place(graph, ids, page, &id, rect, depth, config);
            y += section.height + config.section_gap;
        }
    }
}

fn measure_all(sections: &[Section], config: &LayoutConfig) -> Vec<SectionBlock> {
    sections
        .iter()
        .map(|section| SectionBlock::measure(section, config))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn stacked_height(blocks: &[SectionBlock], config: &LayoutConfig) -> f64 {
    if blocks.is_empty() {
        return 0.0;
    }
    let gaps = (blocks.len() - 1) as f64 * config.section_gap;
    blocks.iter().map(|block| block.height).sum::<f64>() + gaps
}

fn tooltip(section: &Section) -> String {
    let mut tooltip = if section.heading.trim().is_empty() {
        UNTITLED_SECTION.to_owned()
    } else {
        format!("{}: {}", section.label(), section.heading.trim())
    };
    if !section.attachments.is_empty() {
        tooltip.push_str("\nAttachments: ");
        tooltip.push_str(&section.attachments.join(", "));
    }
    tooltip
}
