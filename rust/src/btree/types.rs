//! Page types for the ordered map.

use std::fmt;
use std::sync::Arc;

use crate::context::PageArity;

/// A persistent page of an ordered map: a leaf of `(key, value)` slots or a
/// node of child pages separated by knots.
///
/// Pages are immutable. Every update builds new pages along the touched path
/// and shares everything else with the page it started from, so cloning a page
/// is a reference count increment.
///
/// The canonical empty page holds no allocation at all; every operation that
/// empties a page returns it, and [`BTreePage::is_empty`] recognizes it by
/// identity.
pub struct BTreePage<K, V, U = ()> {
    pub(super) repr: Option<Arc<BTreeKind<K, V, U>>>,
}

pub(super) enum BTreeKind<K, V, U> {
    Leaf(BTreeLeaf<K, V, U>),
    Node(BTreeNode<K, V, U>),
}

/// Slots strictly ascending by key.
pub(super) struct BTreeLeaf<K, V, U> {
    pub(super) slots: Arc<Vec<(K, V)>>,
    pub(super) fold: Option<U>,
}

/// `knots[i]` is the smallest key under `pages[i + 1]`.
pub(super) struct BTreeNode<K, V, U> {
    pub(super) pages: Vec<BTreePage<K, V, U>>,
    pub(super) knots: Vec<K>,
    pub(super) size: usize,
    pub(super) fold: Option<U>,
}

/// Borrowed view of a page, with the empty page seen as an empty leaf.
pub(super) enum PageView<'a, K, V, U> {
    Leaf(&'a [(K, V)]),
    Node(&'a BTreeNode<K, V, U>),
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl<K, V, U> BTreePage<K, V, U> {
    /// The canonical empty page.
    pub const fn empty() -> Self {
        Self { repr: None }
    }

    /// Builds a leaf from slots already sorted by key, without duplicates.
    pub(crate) fn leaf(slots: Vec<(K, V)>) -> Self {
        Self::leaf_from_arc(Arc::new(slots))
    }

    pub(super) fn leaf_from_arc(slots: Arc<Vec<(K, V)>>) -> Self {
        if slots.is_empty() {
            return Self::empty();
        }
        Self::from_kind(BTreeKind::Leaf(BTreeLeaf { slots, fold: None }))
    }

    pub(super) fn from_node(node: BTreeNode<K, V, U>) -> Self {
        Self::from_kind(BTreeKind::Node(node))
    }

    pub(super) fn from_kind(kind: BTreeKind<K, V, U>) -> Self {
        Self {
            repr: Some(Arc::new(kind)),
        }
    }

    pub(super) fn view(&self) -> PageView<'_, K, V, U> {
        match self.repr.as_deref() {
            None => PageView::Leaf(&[]),
            Some(BTreeKind::Leaf(leaf)) => PageView::Leaf(&leaf.slots),
            Some(BTreeKind::Node(node)) => PageView::Node(node),
        }
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

impl<K, V, U> BTreePage<K, V, U> {
    /// Returns true for the canonical empty page.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.repr.is_none()
    }

    /// Returns true when both handles refer to the same page.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of entries under this page.
    pub fn size(&self) -> usize {
        match self.view() {
            PageView::Leaf(slots) => slots.len(),
            PageView::Node(node) => node.size,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.view(), PageView::Leaf(_))
    }

    pub fn is_node(&self) -> bool {
        matches!(self.view(), PageView::Node(_))
    }

    /// Cached fold of this page, present once [`reduced`](Self::reduced) ran.
    pub fn fold(&self) -> Option<&U> {
        match self.repr.as_deref() {
            None => None,
            Some(BTreeKind::Leaf(leaf)) => leaf.fold.as_ref(),
            Some(BTreeKind::Node(node)) => node.fold.as_ref(),
        }
    }

    /// Smallest key under a non-empty page.
    pub(super) fn min_key(&self) -> &K {
        match self.view() {
            PageView::Leaf(slots) => &slots[0].0,
            PageView::Node(node) => node.pages[0].min_key(),
        }
    }

    /// Where [`balanced`](Self::balanced) and node-level splits cut this page.
    pub(super) fn split_point(&self) -> usize {
        match self.view() {
            PageView::Leaf(slots) => slots.len() / 2,
            PageView::Node(node) => node.knots.len() / 2,
        }
    }
}

impl<K, V, U> PageArity for BTreePage<K, V, U> {
    fn arity(&self) -> usize {
        match self.view() {
            PageView::Leaf(slots) => slots.len(),
            PageView::Node(node) => node.pages.len(),
        }
    }
}

impl<K, V, U> Clone for BTreePage<K, V, U> {
    fn clone(&self) -> Self {
        Self {
            repr: self.repr.clone(),
        }
    }
}

impl<K, V, U> Default for BTreePage<K, V, U> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, U> fmt::Debug for BTreePage<K, V, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view() {
            PageView::Leaf(slots) => f.debug_map().entries(slots.iter().map(|(k, v)| (k, v))).finish(),
            PageView::Node(node) => f
                .debug_struct("Node")
                .field("size", &node.size)
                .field("knots", &node.knots)
                .field("pages", &node.pages)
                .finish(),
        }
    }
}

impl<K: Clone, V, U> BTreeNode<K, V, U> {
    /// Node over `pages` with knots and size derived from them.
    pub(super) fn from_pages(pages: Vec<BTreePage<K, V, U>>) -> Self {
        let knots = pages.iter().skip(1).map(|page| page.min_key().clone()).collect();
        let size = pages.iter().map(BTreePage::size).sum();
        Self {
            pages,
            knots,
            size,
            fold: None,
        }
    }
}
