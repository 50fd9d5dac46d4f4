//! Page types for the indexed sequence.

use std::fmt;
use std::sync::Arc;

use crate::context::PageArity;
use crate::search::cumulative_knots;

/// A persistent page of an indexed sequence: a leaf of `(id, value)` slots in
/// positional order, or a node of child pages separated by cumulative counts.
///
/// Like [`BTreePage`](crate::BTreePage), pages are immutable and shared
/// between every tree that reaches them; the canonical empty page holds no
/// allocation.
pub struct STreePage<V, I = u64, U = ()> {
    pub(super) repr: Option<Arc<STreeKind<V, I, U>>>,
}

pub(super) enum STreeKind<V, I, U> {
    Leaf(STreeLeaf<V, I, U>),
    Node(STreeNode<V, I, U>),
}

pub(super) struct STreeLeaf<V, I, U> {
    pub(super) slots: Arc<Vec<(I, V)>>,
    pub(super) fold: Option<U>,
}

/// `knots[i]` is the number of elements under `pages[0..=i]`.
pub(super) struct STreeNode<V, I, U> {
    pub(super) pages: Vec<STreePage<V, I, U>>,
    pub(super) knots: Vec<usize>,
    pub(super) size: usize,
    pub(super) fold: Option<U>,
}

pub(super) enum PageView<'a, V, I, U> {
    Leaf(&'a [(I, V)]),
    Node(&'a STreeNode<V, I, U>),
}

impl<V, I, U> STreePage<V, I, U> {
    /// The canonical empty page.
    pub const fn empty() -> Self {
        Self { repr: None }
    }

    pub(super) fn leaf(slots: Vec<(I, V)>) -> Self {
        Self::leaf_from_arc(Arc::new(slots))
    }

    pub(super) fn leaf_from_arc(slots: Arc<Vec<(I, V)>>) -> Self {
        if slots.is_empty() {
            return Self::empty();
        }
        Self::from_kind(STreeKind::Leaf(STreeLeaf { slots, fold: None }))
    }

    pub(super) fn from_node(node: STreeNode<V, I, U>) -> Self {
        Self::from_kind(STreeKind::Node(node))
    }

    pub(super) fn from_kind(kind: STreeKind<V, I, U>) -> Self {
        Self {
            repr: Some(Arc::new(kind)),
        }
    }

    pub(super) fn view(&self) -> PageView<'_, V, I, U> {
        match self.repr.as_deref() {
            None => PageView::Leaf(&[]),
            Some(STreeKind::Leaf(leaf)) => PageView::Leaf(&leaf.slots),
            Some(STreeKind::Node(node)) => PageView::Node(node),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.repr.is_none()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of elements under this page.
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

    pub fn fold(&self) -> Option<&U> {
        match self.repr.as_deref() {
            None => None,
            Some(STreeKind::Leaf(leaf)) => leaf.fold.as_ref(),
            Some(STreeKind::Node(node)) => node.fold.as_ref(),
        }
    }

    pub(super) fn split_point(&self) -> usize {
        match self.view() {
            PageView::Leaf(slots) => slots.len() / 2,
            PageView::Node(node) => node.knots.len() / 2,
        }
    }
}

impl<V, I, U> PageArity for STreePage<V, I, U> {
    fn arity(&self) -> usize {
        match self.view() {
            PageView::Leaf(slots) => slots.len(),
            PageView::Node(node) => node.pages.len(),
        }
    }
}

impl<V, I, U> Clone for STreePage<V, I, U> {
    fn clone(&self) -> Self {
        Self {
            repr: self.repr.clone(),
        }
    }
}

impl<V, I, U> Default for STreePage<V, I, U> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: fmt::Debug, I: fmt::Debug, U> fmt::Debug for STreePage<V, I, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view() {
            PageView::Leaf(slots) => f.debug_list().entries(slots.iter()).finish(),
            PageView::Node(node) => f
                .debug_struct("Node")
                .field("size", &node.size)
                .field("knots", &node.knots)
                .field("pages", &node.pages)
                .finish(),
        }
    }
}

impl<V, I, U> STreeNode<V, I, U> {
    /// Node over `pages` with knots and size derived from them.
    pub(super) fn from_pages(pages: Vec<STreePage<V, I, U>>) -> Self {
        let knots = cumulative_knots(&pages, STreePage::size);
        let size = pages.iter().map(STreePage::size).sum();
        Self {
            pages,
            knots,
            size,
            fold: None,
        }
    }

    /// Child holding position `index` and the position within it.
    pub(super) fn locate(&self, index: usize) -> (usize, usize) {
        let x = match self.knots.binary_search(&index) {
            Ok(found) => found + 1,
            Err(insertion) => insertion,
        };
        let offset = if x == 0 { index } else { index - self.knots[x - 1] };
        (x, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(values: &[char]) -> STreePage<char, u64> {
        STreePage::leaf(values.iter().enumerate().map(|(i, &v)| (i as u64, v)).collect())
    }

    #[test]
    fn test_empty_page_is_canonical() {
        let empty: STreePage<char> = STreePage::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.size(), 0);
        assert!(empty.ptr_eq(&STreePage::default()));
        assert!(leaf(&[]).is_empty());
    }

    #[test]
    fn test_node_knots_are_cumulative() {
        let node = STreeNode::from_pages(vec![leaf(&['a', 'b', 'c']), leaf(&['d', 'e']), leaf(&['f'])]);
        assert_eq!(node.knots, vec![3, 5]);
        assert_eq!(node.size, 6);
        assert_eq!(node.locate(0), (0, 0));
        assert_eq!(node.locate(2), (0, 2));
        assert_eq!(node.locate(3), (1, 0));
        assert_eq!(node.locate(4), (1, 1));
        assert_eq!(node.locate(5), (2, 0));
        assert_eq!(node.locate(6), (2, 1), "one past the end lands after the last child");
    }
}
