//! Traversal and cursors for sequence pages.

use std::sync::Arc;

use super::types::{PageView, STreeKind, STreeNode, STreePage};
use crate::cursor::{CursorPage, NodeCursor, PageCursor, SlotCursor};

impl<V, I, U> STreePage<V, I, U> {
    /// Visits `(id, value)` slots in order until `f` returns a value.
    pub fn for_each_entry<R, F>(&self, f: &mut F) -> Option<R>
    where
        F: FnMut(&I, &V) -> Option<R>,
    {
        match self.view() {
            PageView::Leaf(slots) => slots.iter().find_map(|(id, value)| f(id, value)),
            PageView::Node(node) => node.pages.iter().find_map(|page| page.for_each_entry(f)),
        }
    }

    /// Leaf slot runs in sequence order.
    pub(super) fn leaf_runs(&self) -> Vec<&[(I, V)]> {
        let mut runs = Vec::new();
        self.collect_leaf_runs(&mut runs);
        runs
    }

    fn collect_leaf_runs<'a>(&'a self, runs: &mut Vec<&'a [(I, V)]>) {
        match self.view() {
            PageView::Leaf(slots) => runs.push(slots),
            PageView::Node(node) => node.pages.iter().for_each(|page| page.collect_leaf_runs(runs)),
        }
    }

    /// Visits values in order until `f` returns a value.
    pub fn for_each<R, F>(&self, f: &mut F) -> Option<R>
    where
        F: FnMut(&V) -> Option<R>,
    {
        self.for_each_entry(&mut |_, value| f(value))
    }
}

impl<V: Clone, I: Clone, U: Clone> STreePage<V, I, U> {
    pub fn entries(&self) -> PageCursor<Self> {
        CursorPage::cursor(self)
    }

    pub fn reverse_entries(&self) -> PageCursor<Self> {
        CursorPage::reverse_cursor(self)
    }
}

impl<V: Clone, I: Clone, U: Clone> CursorPage for STreePage<V, I, U> {
    type Slot = (I, V);

    fn size(&self) -> usize {
        STreePage::size(self)
    }

    fn cursor(&self) -> PageCursor<Self> {
        match self.repr.as_deref() {
            None => PageCursor::empty(),
            Some(STreeKind::Leaf(leaf)) => PageCursor::Leaf(SlotCursor::new(leaf.slots.clone())),
            Some(STreeKind::Node(node)) => {
                PageCursor::Node(NodeCursor::new(node.pages.clone(), node.size))
            }
        }
    }

    fn reverse_cursor(&self) -> PageCursor<Self> {
        match self.repr.as_deref() {
            None => PageCursor::empty(),
            Some(STreeKind::Leaf(leaf)) => {
                PageCursor::Leaf(SlotCursor::at_end(leaf.slots.clone()))
            }
            Some(STreeKind::Node(node)) => {
                PageCursor::Node(NodeCursor::at_end(node.pages.clone(), node.size))
            }
        }
    }

    fn rebuild_leaf(slots: Arc<Vec<(I, V)>>) -> Self {
        Self::leaf_from_arc(slots)
    }

    fn rebuild_node(pages: Vec<Self>) -> Self {
        let mut pages: Vec<Self> = pages.into_iter().filter(|page| !page.is_empty()).collect();
        match pages.len() {
            0 => Self::empty(),
            1 => pages.remove(0),
            _ => Self::from_node(STreeNode::from_pages(pages)),
        }
    }
}
