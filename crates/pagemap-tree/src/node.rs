//! Page tree types.

use std::fmt;

use pagemap_outline::Section;
use serde::Serialize;

use crate::source::FetchError;

/// Opaque page identifier assigned by the content service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a page id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of the space with its outline and children.
///
/// A page appears at most once in a tree. Later references to an already
/// placed page are recorded as [`Child::CrossReference`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageNode {
    /// Page id.
    pub id: PageId,
    /// Page title.
    pub title: String,
    /// Top-level sections of the page content.
    pub outline: Vec<Section>,
    /// Children in the order the content service listed them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
    /// Distance from the root (root is 0).
    pub depth: usize,
}

/// Entry in a page's child list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Child {
    /// Child page owned by this node.
    Page(PageNode),
    /// Page owned elsewhere in the tree.
    CrossReference {
        /// Referenced page.
        id: PageId,
    },
    /// Branch that could not be resolved.
    Unresolved(FetchError),
}

impl PageNode {
    /// Create a page node without children.
    #[must_use]
    pub fn new(id: PageId, title: impl Into<String>, outline: Vec<Section>, depth: usize) -> Self {
        Self {
            id,
            title: title.into(),
            outline,
            children: Vec::new(),
            depth,
        }
    }

    /// Owned child pages, in order.
    pub fn child_pages(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Child::Page(page) => Some(page),
            Child::CrossReference { .. } | Child::Unresolved(_) => None,
        })
    }

    /// Number of pages in this subtree, including `self`.
    #[must_use]
    pub fn page_count(&self) -> usize {
        1 + self.child_pages().map(Self::page_count).sum::<usize>()
    }

    /// Find a page in this subtree.
    #[must_use]
    pub fn find(&self, id: &PageId) -> Option<&Self> {
        if &self.id == id {
            return Some(self);
        }
        self.child_pages().find_map(|child| child.find(id))
    }

    /// Visit every page in this subtree in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        for child in self.child_pages() {
            child.walk(visit);
        }
    }
}
