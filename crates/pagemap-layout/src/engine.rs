//! Page-level tree layout.
//!
//! The tree is flattened into a pre-order arena of slots, so every parent
//! index is smaller than its children's. Sizing walks the arena backwards
//! (a valid post-order), placement walks it forwards. Neither pass
//! recurses over the page tree.
//!
//! Each slot has a footprint: the wider of its own box and its children's
//! combined footprints plus sibling gaps. Siblings get disjoint footprints
//! left to right, and every box is centered in its footprint, which puts a
//! parent centered above the span of its children.

use pagemap_tree::{Child, FetchError, PageNode};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::geometry::{EPSILON, LayoutRect};
use crate::graph::{LayoutEdge, LayoutGraph, LayoutNode, NodeIds, NodeKind, Routing};
use crate::outline::OutlineBlock;
use crate::text::{page_label, truncate};

/// Lay out a page tree.
///
/// Never fails: pages with empty titles or content get the minimum page
/// size.
#[must_use]
pub fn layout(root: &PageNode, config: &LayoutConfig) -> LayoutGraph {
    let mut slots = collect(root, config);
    let mut ids = NodeIds::new(
        slots
            .iter()
            .filter(|slot| slot.is_page())
            .map(|slot| slot.id.clone()),
    );
    for slot in slots.iter_mut().filter(|slot| !slot.is_page()) {
        slot.id = ids.claim(std::mem::take(&mut slot.id));
    }
    size(&mut slots, config);
    let row_top = rows(&slots, config);
    place(&mut slots, &row_top, config);

    let graph = emit(&slots, &mut ids, config);
    debug!(
        pages = slots.iter().filter(|slot| slot.is_page()).count(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "Layout complete"
    );
    graph
}

enum Content {
    Page {
        label: String,
        tooltip: String,
        outline: OutlineBlock,
        cross_references: Vec<String>,
    },
    Marker {
        label: String,
        tooltip: String,
    },
}

struct Slot {
    id: String,
    depth: usize,
    content: Content,
    children: Vec<usize>,
    width: f64,
    height: f64,
    /// Width of the span of children, gaps included.
    span: f64,
    footprint: f64,
    /// Left edge of the footprint.
    left: f64,
    rect: LayoutRect,
}

impl Slot {
    fn page(page: &PageNode, depth: usize, config: &LayoutConfig) -> Self {
        let metrics = config.metrics();
        let label = page_label(&page.title, config.max_label_chars);
        let outline = OutlineBlock::measure(&page.outline, config);

        let width = (metrics.width(&label) + 2.0 * config.padding)
            .max(outline.width + 2.0 * config.padding)
            .max(config.min_page_width);
        let mut height = config.title_band();
        if !outline.is_empty() {
            height += outline.height + config.padding;
        }

        let cross_references = page
            .children
            .iter()
            .filter_map(|child| match child {
                Child::CrossReference { id } => Some(id.to_string()),
                Child::Page(_) | Child::Unresolved(_) => None,
            })
            .collect();

        Self::new(
            page.id.to_string(),
            depth,
            Content::Page {
                tooltip: if page.title.trim().is_empty() {
                    label.clone()
                } else {
                    page.title.clone()
                },
                label,
                outline,
                cross_references,
            },
            width,
            height.max(config.min_page_height),
        )
    }

    fn marker(id: String, error: &FetchError, depth: usize, config: &LayoutConfig) -> Self {
        let label = truncate(
            &format!("{} ({})", error.id, error.kind),
            config.max_label_chars,
        );
        let width = (config.metrics().width(&label) + 2.0 * config.padding).max(config.marker_width);
        Self::new(
            id,
            depth,
            Content::Marker {
                label,
                tooltip: error.to_string(),
            },
            width,
            config.marker_height,
        )
    }

    fn new(id: String, depth: usize, content: Content, width: f64, height: f64) -> Self {
        Self {
            id,
            depth,
            content,
            children: Vec::new(),
            width,
            height,
            span: 0.0,
            footprint: width,
            left: 0.0,
            rect: LayoutRect::default(),
        }
    }

    fn is_page(&self) -> bool {
        matches!(self.content, Content::Page { .. })
    }
}

enum Pending<'a> {
    Page(&'a PageNode, Option<usize>),
    Marker(&'a FetchError, usize, String),
}

/// Flatten the tree into a pre-order arena.
fn collect(root: &PageNode, config: &LayoutConfig) -> Vec<Slot> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut pending = vec![Pending::Page(root, None)];

    while let Some(entry) = pending.pop() {
        let index = slots.len();
        let parent = match entry {
            Pending::Page(page, parent) => {
                let depth = parent.map_or(0, |p| slots[p].depth + 1);
                slots.push(Slot::page(page, depth, config));
                for (n, child) in page.children.iter().enumerate().rev() {
                    match child {
                        Child::Page(child) => pending.push(Pending::Page(child, Some(index))),
                        Child::Unresolved(error) => pending.push(Pending::Marker(
                            error,
                            index,
                            format!("{}!{}", page.id, n + 1),
                        )),
                        Child::CrossReference { .. } => {}
                    }
                }
                parent
            }
            Pending::Marker(error, parent, id) => {
                let depth = slots[parent].depth + 1;
                slots.push(Slot::marker(id, error, depth, config));
                Some(parent)
            }
        };
        if let Some(parent) = parent {
            slots[parent].children.push(index);
        }
    }
    slots
}

/// Compute spans and footprints bottom-up.
#[allow(clippy::cast_precision_loss)]
fn size(slots: &mut [Slot], config: &LayoutConfig) {
    for index in (0..slots.len()).rev() {
        let children = &slots[index].children;
        let span = if children.is_empty() {
            0.0
        } else {
            let widths: f64 = children.iter().map(|&child| slots[child].footprint).sum();
            widths + (children.len() - 1) as f64 * config.sibling_gap
        };
        let slot = &mut slots[index];
        slot.span = span;
        slot.footprint = slot.width.max(span);
    }
}

/// Top edge of each row, one row per depth.
fn rows(slots: &[Slot], config: &LayoutConfig) -> Vec<f64> {
    let deepest = slots.iter().map(|slot| slot.depth).max().unwrap_or(0);
    let mut heights = vec![0.0_f64; deepest + 1];
    for slot in slots {
        heights[slot.depth] = heights[slot.depth].max(slot.height);
    }

    let mut top = 0.0;
    heights
        .iter()
        .map(|height| {
            let row = top;
            top += height + config.level_gap;
            row
        })
        .collect()
}

/// Assign rectangles top-down.
fn place(slots: &mut [Slot], row_top: &[f64], config: &LayoutConfig) {
    for index in 0..slots.len() {
        let slot = &mut slots[index];
        slot.rect = LayoutRect::new(
            slot.left + (slot.footprint - slot.width) / 2.0,
            row_top[slot.depth],
            slot.width,
            slot.height,
        );

        let mut cursor = slot.left + (slot.footprint - slot.span) / 2.0;
        for n in 0..slots[index].children.len() {
            let child_index = slots[index].children[n];
            let child = &mut slots[child_index];
            child.left = cursor;
            cursor += child.footprint + config.sibling_gap;
        }
    }
}

/// Build the graph from placed slots, in arena order.
fn emit(slots: &[Slot], ids: &mut NodeIds, config: &LayoutConfig) -> LayoutGraph {
    let mut graph = LayoutGraph {
        root: slots.first().map(|slot| slot.id.clone()).unwrap_or_default(),
        ..LayoutGraph::default()
    };

    for slot in slots {
        match &slot.content {
            Content::Page {
                label,
                tooltip,
                outline,
                cross_references,
            } => {
                graph.insert(
                    slot.id.clone(),
                    LayoutNode {
                        kind: NodeKind::Page,
                        rect: slot.rect,
                        label: label.clone(),
                        detail: Vec::new(),
                        tooltip: tooltip.clone(),
                        depth: slot.depth,
                    },
                );
                let area = LayoutRect::new(
                    slot.rect.x + config.padding,
                    slot.rect.y + config.title_band(),
                    slot.rect.width - 2.0 * config.padding,
                    outline.height,
                );
                outline.place(&mut graph, ids, &slot.id, area, slot.depth, config);
                graph
                    .cross_references
                    .extend(cross_references.iter().map(|target| LayoutEdge {
                        from: slot.id.clone(),
                        to: target.clone(),
                        routing: Routing::Orthogonal,
                    }));
            }
            Content::Marker { label, tooltip } => {
                graph.insert(
                    slot.id.clone(),
                    LayoutNode {
                        kind: NodeKind::Unresolved,
                        rect: slot.rect,
                        label: label.clone(),
                        detail: Vec::new(),
                        tooltip: tooltip.clone(),
                        depth: slot.depth,
                    },
                );
            }
        }

        for &child in &slot.children {
            let child = &slots[child];
            let routing = if (child.rect.center_x() - slot.rect.center_x()).abs() < EPSILON {
                Routing::Straight
            } else {
                Routing::Orthogonal
            };
            graph.connect(&slot.id, &child.id, routing);
        }
    }
    graph
}
