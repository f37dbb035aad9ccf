//! Page tree reconstruction.
//!
//! The traversal is an explicit-stack depth-first walk. Every open page is a
//! [`Frame`] holding the partially built node and its lazy child listing;
//! the loop pulls one child id at a time from the innermost frame, so child
//! batches are requested only as the walk reaches them and the call stack
//! never grows with the depth of the space.

use std::collections::HashSet;
use std::mem;

use pagemap_outline::chunk_content;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::abort::AbortSignal;
use crate::node::{Child, PageId, PageNode};
use crate::source::{ChildIds, ContentSource, FetchError, PageContent};

/// Default bound on page depth below the root.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Traversal settings.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Deepest page depth that is still fetched (root is 0).
    pub max_depth: usize,
    /// Title the caller expects the root page to have.
    pub expected_root_title: Option<String>,
    /// Caller-controlled cancellation.
    pub abort: AbortSignal,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            expected_root_title: None,
            abort: AbortSignal::new(),
        }
    }
}

/// Back-edge found while walking the hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("page {child} listed under {parent} is one of its ancestors")]
pub struct CycleError {
    /// Page whose listing contained the back-edge.
    pub parent: PageId,
    /// Ancestor that was listed again.
    pub child: PageId,
}

/// Non-fatal anomaly found while building the tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Diagnostic {
    /// Back-edge omitted from the tree.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Page already placed elsewhere, recorded as a cross-reference.
    #[error("page {child} listed under {parent} is already placed elsewhere")]
    CrossReference {
        /// Page whose listing contained the duplicate.
        parent: PageId,
        /// Page already owned by another node.
        child: PageId,
    },

    /// Branch replaced by an unresolved marker.
    #[error(transparent)]
    Fetch(FetchError),

    /// Branch below the depth bound replaced by an unresolved marker.
    #[error("page {child} listed under {parent} is deeper than {max_depth} levels")]
    DepthExceeded {
        /// Page at the depth bound.
        parent: PageId,
        /// Page that was not fetched.
        child: PageId,
        /// Depth bound in effect.
        max_depth: usize,
    },

    /// Root page title differs from the expected one.
    #[error("root page is titled \"{actual}\", expected \"{expected}\"")]
    TitleMismatch {
        /// Title given by the caller.
        expected: String,
        /// Title served by the content service.
        actual: String,
    },
}

/// Counters collected during a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Pages placed in the tree.
    pub pages: usize,
    /// Cross-reference entries recorded.
    pub cross_references: usize,
    /// Unresolved markers recorded.
    pub unresolved: usize,
    /// Back-edges omitted.
    pub cycles: usize,
    /// Depth of the deepest placed page.
    pub max_depth: usize,
}

/// Completed tree with everything noticed on the way.
#[derive(Clone, Debug)]
pub struct BuildReport {
    /// Root page.
    pub root: PageNode,
    /// Anomalies in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Build counters.
    pub stats: BuildStats,
}

/// Error that prevents any tree from being produced.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Root page could not be fetched.
    #[error("root page unavailable: {0}")]
    Fetch(#[from] FetchError),

    /// Traversal was aborted by the caller or its deadline passed.
    #[error("traversal aborted")]
    Aborted,
}

/// Reconstructs the page tree below a root page.
pub struct HierarchyBuilder<'s, S: ContentSource + ?Sized> {
    source: &'s S,
    options: BuildOptions,
}

/// Open page: its node so far and the rest of its child listing.
struct Frame<'s> {
    node: PageNode,
    children: ChildIds<'s>,
}

/// State owned by one traversal.
#[derive(Default)]
struct Traversal {
    /// Pages on the path from the root to the current frame.
    on_path: HashSet<PageId>,
    /// Pages placed anywhere in the tree.
    resolved: HashSet<PageId>,
    diagnostics: Vec<Diagnostic>,
    stats: BuildStats,
}

impl Traversal {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn into_report(self, root: PageNode) -> BuildReport {
        BuildReport {
            root,
            diagnostics: self.diagnostics,
            stats: self.stats,
        }
    }
}

impl<'s, S: ContentSource + ?Sized> HierarchyBuilder<'s, S> {
    /// Create a builder over a content source.
    #[must_use]
    pub fn new(source: &'s S, options: BuildOptions) -> Self {
        Self { source, options }
    }

    /// Build the tree rooted at `root_id`.
    ///
    /// Failures below the root never fail the build: they become
    /// [`Child::Unresolved`] markers plus a [`Diagnostic`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Fetch`] if the root page cannot be fetched and
    /// [`BuildError::Aborted`] if the abort signal fires. Partial trees are
    /// discarded in both cases.
    pub fn build(&self, root_id: &PageId) -> Result<BuildReport, BuildError> {
        let mut state = Traversal::default();

        self.check_abort()?;
        let content = self.source.fetch_page(root_id)?;
        if let Some(expected) = &self.options.expected_root_title
            && *expected != content.title
        {
            state.report(Diagnostic::TitleMismatch {
                expected: expected.clone(),
                actual: content.title.clone(),
            });
        }

        let mut stack: Vec<Frame<'s>> = Vec::new();
        let mut current = self.open(root_id.clone(), content, 0, &mut state);

        loop {
            self.check_abort()?;
            match current.children.next() {
                Some(Ok(child_id)) => {
                    if let Some(frame) = self.visit(&mut current, child_id, &mut state)? {
                        stack.push(mem::replace(&mut current, frame));
                    }
                }
                Some(Err(err)) => {
                    current.node.children.push(Child::Unresolved(err.clone()));
                    current.children = Box::new(std::iter::empty());
                    state.stats.unresolved += 1;
                    state.report(Diagnostic::Fetch(err));
                }
                None => {
                    state.on_path.remove(&current.node.id);
                    let Some(parent) = stack.pop() else {
                        info!(
                            pages = state.stats.pages,
                            unresolved = state.stats.unresolved,
                            "Page tree complete"
                        );
                        return Ok(state.into_report(current.node));
                    };
                    let finished = mem::replace(&mut current, parent).node;
                    current.node.children.push(Child::Page(finished));
                }
            }
        }
    }

    /// Handle one listed child of `parent`, returning a frame to descend into.
    fn visit(
        &self,
        parent: &mut Frame<'s>,
        child_id: PageId,
        state: &mut Traversal,
    ) -> Result<Option<Frame<'s>>, BuildError> {
        let parent_id = parent.node.id.clone();
        debug!(parent = %parent_id, child = %child_id, "Listed child page");

        if state.on_path.contains(&child_id) {
            state.stats.cycles += 1;
            state.report(Diagnostic::Cycle(CycleError {
                parent: parent_id,
                child: child_id,
            }));
            return Ok(None);
        }

        if state.resolved.contains(&child_id) {
            parent.node.children.push(Child::CrossReference {
                id: child_id.clone(),
            });
            state.stats.cross_references += 1;
            state.report(Diagnostic::CrossReference {
                parent: parent_id,
                child: child_id,
            });
            return Ok(None);
        }

        let depth = parent.node.depth + 1;
        let max_depth = self.options.max_depth;
        if depth > max_depth {
            parent
                .node
                .children
                .push(Child::Unresolved(FetchError::depth_exceeded(
                    child_id.clone(),
                    max_depth,
                )));
            state.stats.unresolved += 1;
            state.report(Diagnostic::DepthExceeded {
                parent: parent_id,
                child: child_id,
                max_depth,
            });
            return Ok(None);
        }

        self.check_abort()?;
        match self.source.fetch_page(&child_id) {
            Ok(content) => Ok(Some(self.open(child_id, content, depth, state))),
            Err(err) => {
                parent.node.children.push(Child::Unresolved(err.clone()));
                state.stats.unresolved += 1;
                state.report(Diagnostic::Fetch(err));
                Ok(None)
            }
        }
    }

    /// Place a fetched page and start its child listing.
    fn open(
        &self,
        id: PageId,
        content: PageContent,
        depth: usize,
        state: &mut Traversal,
    ) -> Frame<'s> {
        info!(id = %id, title = %content.title, depth, "Fetched page");

        let outline = chunk_content(&content.body, content.format);
        state.on_path.insert(id.clone());
        state.resolved.insert(id.clone());
        state.stats.pages += 1;
        state.stats.max_depth = state.stats.max_depth.max(depth);

        let children = self.source.list_children(&id);
        Frame {
            node: PageNode::new(id, content.title, outline, depth),
            children,
        }
    }

    fn check_abort(&self) -> Result<(), BuildError> {
        if self.options.abort.is_aborted() {
            info!("Traversal aborted, discarding partial tree");
            return Err(BuildError::Aborted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockSource;
    use crate::source::FetchErrorKind;

    fn build(source: &MockSource, root: &str) -> BuildReport {
        HierarchyBuilder::new(source, BuildOptions::default())
            .build(&PageId::from(root))
            .unwrap()
    }

    /// Compact view of a child list: `id`, `~id` for cross-references and
    /// `!id` for unresolved markers.
    fn children(node: &PageNode) -> Vec<String> {
        node.children
            .iter()
            .map(|child| match child {
                Child::Page(page) => page.id.to_string(),
                Child::CrossReference { id } => format!("~{id}"),
                Child::Unresolved(err) => format!("!{}", err.id),
            })
            .collect()
    }

    fn page<'a>(root: &'a PageNode, id: &str) -> &'a PageNode {
        root.find(&PageId::from(id)).unwrap()
    }

    #[test]
    fn test_builds_nested_tree_with_outlines() {
        let source = MockSource::new()
            .with_page("1", "Home", "# Welcome\nhello")
            .with_storage_page("2", "Guide", "<h1>Install</h1><p>run it</p>")
            .with_page("3", "Faq", "")
            .with_children("1", &["2", "3"]);

        let report = build(&source, "1");

        assert_eq!(children(&report.root), vec!["2", "3"]);
        assert_eq!(report.root.outline[0].heading, "Welcome");
        let guide = page(&report.root, "2");
        assert_eq!(guide.depth, 1);
        assert_eq!(guide.outline[0].heading, "Install");
        assert_eq!(guide.outline[0].body, "run it");
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.stats.pages, 3);
        assert_eq!(report.stats.max_depth, 1);
    }

    #[test]
    fn test_cycle_terminates_with_single_diagnostic() {
        let source = MockSource::new()
            .with_page("x", "X", "")
            .with_page("y", "Y", "")
            .with_children("x", &["y"])
            .with_children("y", &["x"]);

        let report = build(&source, "x");

        assert_eq!(children(&report.root), vec!["y"]);
        assert!(page(&report.root, "y").children.is_empty());
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::Cycle(CycleError {
                parent: PageId::from("y"),
                child: PageId::from("x"),
            })]
        );
        assert_eq!(report.stats.pages, 2);
        assert_eq!(report.stats.cycles, 1);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let source = MockSource::new()
            .with_page("1", "Loop", "")
            .with_children("1", &["1"]);

        let report = build(&source, "1");

        assert!(report.root.children.is_empty());
        assert_eq!(report.stats.cycles, 1);
    }

    #[test]
    fn test_failing_child_is_isolated() {
        let source = MockSource::new()
            .with_page("1", "Root", "")
            .with_page("2", "A", "")
            .with_page("4", "C", "")
            .with_children("1", &["2", "3", "4"])
            .failing_page("3", FetchErrorKind::PermissionDenied);

        let report = build(&source, "1");

        assert_eq!(children(&report.root), vec!["2", "!3", "4"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            &report.diagnostics[0],
            Diagnostic::Fetch(err) if err.kind == FetchErrorKind::PermissionDenied
        ));
        assert_eq!(report.stats.unresolved, 1);
    }

    #[test]
    fn test_missing_child_page_becomes_marker() {
        let source = MockSource::new()
            .with_page("1", "Root", "")
            .with_children("1", &["gone"]);

        let report = build(&source, "1");

        assert_eq!(children(&report.root), vec!["!gone"]);
    }

    #[test]
    fn test_duplicate_child_becomes_cross_reference() {
        let source = MockSource::new()
            .with_page("1", "Root", "")
            .with_page("2", "A", "")
            .with_page("3", "B", "")
            .with_page("4", "Shared", "")
            .with_children("1", &["2", "3"])
            .with_children("2", &["4"])
            .with_children("3", &["4"]);

        let report = build(&source, "1");

        assert_eq!(children(page(&report.root, "2")), vec!["4"]);
        assert_eq!(children(page(&report.root, "3")), vec!["~4"]);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::CrossReference {
                parent: PageId::from("3"),
                child: PageId::from("4"),
            }]
        );
        assert_eq!(report.root.page_count(), 4);
        assert_eq!(source.page_fetches(), 4);
    }

    #[test]
    fn test_depth_bound_leaves_marker() {
        let source = MockSource::new()
            .with_page("1", "L0", "")
            .with_page("2", "L1", "")
            .with_page("3", "L2", "")
            .with_page("4", "L3", "")
            .with_children("1", &["2"])
            .with_children("2", &["3"])
            .with_children("3", &["4"]);
        let options = BuildOptions {
            max_depth: 2,
            ..BuildOptions::default()
        };

        let report = HierarchyBuilder::new(&source, options)
            .build(&PageId::from("1"))
            .unwrap();

        let deepest = page(&report.root, "3");
        assert_eq!(children(deepest), vec!["!4"]);
        assert!(matches!(
            &deepest.children[0],
            Child::Unresolved(err) if err.kind == FetchErrorKind::DepthExceeded
        ));
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::DepthExceeded {
                parent: PageId::from("3"),
                child: PageId::from("4"),
                max_depth: 2,
            }]
        );
        assert_eq!(source.page_fetches(), 3);
    }

    #[test]
    fn test_listing_failure_keeps_resolved_children() {
        let source = MockSource::new()
            .with_page("1", "Root", "")
            .with_page("2", "A", "")
            .with_page("3", "B", "")
            .with_children("1", &["2", "3"])
            .failing_children_after("1", 1, FetchErrorKind::Unavailable);

        let report = build(&source, "1");

        assert_eq!(children(&report.root), vec!["2", "!1"]);
        assert_eq!(report.stats.pages, 2);
        assert!(matches!(
            &report.diagnostics[0],
            Diagnostic::Fetch(err) if err.kind == FetchErrorKind::Unavailable
        ));
    }

    #[test]
    fn test_children_keep_listing_order() {
        let source = MockSource::new()
            .with_page("r", "Root", "")
            .with_page("c", "Same", "")
            .with_page("a", "Same", "")
            .with_page("b", "Other", "")
            .with_children("r", &["c", "a", "b"]);

        let report = build(&source, "r");

        assert_eq!(children(&report.root), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_child_batches_requested_as_walk_advances() {
        let source = MockSource::new()
            .with_page("r", "Root", "")
            .with_page("a", "A", "")
            .with_page("b", "B", "")
            .with_page("c", "C", "")
            .with_page("d", "D", "")
            .with_page("e", "E", "")
            .with_children("r", &["a", "b", "c", "d", "e"])
            .with_page_size(2);

        let report = build(&source, "r");

        assert_eq!(children(&report.root), vec!["a", "b", "c", "d", "e"]);
        // Three batches for the root, one (empty) for each leaf.
        assert_eq!(source.batch_requests(), 8);
    }

    #[test]
    fn test_root_failure_is_fatal() {
        let source = MockSource::new().failing_page("1", FetchErrorKind::Unavailable);

        let result = HierarchyBuilder::new(&source, BuildOptions::default())
            .build(&PageId::from("1"));

        assert!(matches!(
            result,
            Err(BuildError::Fetch(err)) if err.kind == FetchErrorKind::Unavailable
        ));
    }

    #[test]
    fn test_abort_discards_tree() {
        let source = MockSource::new()
            .with_page("1", "Root", "")
            .with_children("1", &["2"]);
        let abort = AbortSignal::new();
        abort.abort();
        let options = BuildOptions {
            abort,
            ..BuildOptions::default()
        };

        let result = HierarchyBuilder::new(&source, options).build(&PageId::from("1"));

        assert!(matches!(result, Err(BuildError::Aborted)));
        assert_eq!(source.page_fetches(), 0);
    }

    #[test]
    fn test_title_mismatch_is_a_warning() {
        let source = MockSource::new().with_page("1", "Start", "");
        let options = BuildOptions {
            expected_root_title: Some("Home".to_owned()),
            ..BuildOptions::default()
        };

        let report = HierarchyBuilder::new(&source, options)
            .build(&PageId::from("1"))
            .unwrap();

        assert_eq!(report.root.title, "Start");
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::TitleMismatch {
                expected: "Home".to_owned(),
                actual: "Start".to_owned(),
            }]
        );
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut source = MockSource::new();
        let ids: Vec<String> = (0..500).map(|n| n.to_string()).collect();
        for (n, id) in ids.iter().enumerate() {
            source = source.with_page(id, id, "");
            if let Some(next) = ids.get(n + 1) {
                source = source.with_children(id, &[next.as_str()]);
            }
        }
        let options = BuildOptions {
            max_depth: 1000,
            ..BuildOptions::default()
        };

        let report = HierarchyBuilder::new(&source, options)
            .build(&PageId::from("0"))
            .unwrap();

        assert_eq!(report.stats.pages, 500);
        assert_eq!(report.stats.max_depth, 499);
    }
}
