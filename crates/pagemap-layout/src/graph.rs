//! Positioned diagram elements.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::geometry::LayoutRect;

/// What a layout node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A page box.
    Page,
    /// A section box inside a page.
    Section,
    /// Marker for a branch that could not be resolved.
    Unresolved,
}

/// How a renderer should draw an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    /// Single vertical segment.
    Straight,
    /// Vertical-horizontal-vertical elbow.
    Orthogonal,
}

/// Positioned node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutNode {
    /// What the node stands for.
    pub kind: NodeKind,
    /// Box in diagram coordinates.
    pub rect: LayoutRect,
    /// Display label, already truncated.
    pub label: String,
    /// Secondary text drawn under the label (section excerpt lines).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<String>,
    /// Full, untruncated description for tooltips.
    pub tooltip: String,
    /// Depth of the owning page below the root.
    pub depth: usize,
}

/// Directed edge between two node ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    /// Id of the containing (or referring) node.
    pub from: String,
    /// Id of the contained (or referenced) node.
    pub to: String,
    /// Drawing hint.
    pub routing: Routing,
}

/// Complete layout of one page tree.
///
/// Node ids: pages use their page id, sections `{page}#{i}.{j}` (1-based
/// path through the outline), unresolved markers `{parent}!{n}` (1-based
/// position in the parent's child list). A section or marker id that would
/// equal a page id gets `~` appended until it is unique.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayoutGraph {
    /// Id of the root page node.
    pub root: String,
    /// Every node, keyed by id.
    pub nodes: BTreeMap<String, LayoutNode>,
    /// Containment edges in traversal order. Every node except the root has
    /// exactly one incoming containment edge.
    pub edges: Vec<LayoutEdge>,
    /// Non-owning references between pages, always orthogonal.
    pub cross_references: Vec<LayoutEdge>,
    /// Union of all node rectangles.
    pub bounds: LayoutRect,
}

impl LayoutGraph {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    /// Id of the node containing `id`.
    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|edge| edge.to == id)
            .map(|edge| edge.from.as_str())
    }

    /// Nodes of one kind, in id order.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = (&str, &LayoutNode)> {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.kind == kind)
            .map(|(id, node)| (id.as_str(), node))
    }

    pub(crate) fn insert(&mut self, id: String, node: LayoutNode) {
        self.bounds = if self.nodes.is_empty() {
            node.rect
        } else {
            self.bounds.union(&node.rect)
        };
        self.nodes.insert(id, node);
    }

    pub(crate) fn connect(&mut self, from: &str, to: &str, routing: Routing) {
        self.edges.push(LayoutEdge {
            from: from.to_owned(),
            to: to.to_owned(),
            routing,
        });
    }
}

/// Hands out section and marker ids that never shadow a page id.
pub(crate) struct NodeIds {
    taken: HashSet<String>,
}

impl NodeIds {
    /// Reserve the ids of every page in the tree.
    pub(crate) fn new(pages: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: pages.into_iter().collect(),
        }
    }

    /// Claim `candidate`, suffixed with `~` as often as needed.
    pub(crate) fn claim(&mut self, mut candidate: String) -> String {
        while self.taken.contains(&candidate) {
            candidate.push('~');
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}
