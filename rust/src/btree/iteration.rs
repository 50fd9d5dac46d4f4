//! Traversal and cursors for ordered map pages.

use std::sync::Arc;

use super::types::{BTreeKind, BTreeNode, BTreePage, PageView};
use crate::cursor::{CursorPage, NodeCursor, PageCursor, SlotCursor};

impl<K, V, U> BTreePage<K, V, U> {
    /// Visits entries in key order until `f` returns a value.
    pub fn for_each<R, F>(&self, f: &mut F) -> Option<R>
    where
        F: FnMut(&K, &V) -> Option<R>,
    {
        match self.view() {
            PageView::Leaf(slots) => slots.iter().find_map(|(key, value)| f(key, value)),
            PageView::Node(node) => node.pages.iter().find_map(|page| page.for_each(f)),
        }
    }

    /// Leaf slot runs in key order.
    pub(super) fn leaf_runs(&self) -> Vec<&[(K, V)]> {
        let mut runs = Vec::new();
        self.collect_leaf_runs(&mut runs);
        runs
    }

    fn collect_leaf_runs<'a>(&'a self, runs: &mut Vec<&'a [(K, V)]>) {
        match self.view() {
            PageView::Leaf(slots) => runs.push(slots),
            PageView::Node(node) => node.pages.iter().for_each(|page| page.collect_leaf_runs(runs)),
        }
    }

    pub fn for_each_key<R, F>(&self, f: &mut F) -> Option<R>
    where
        F: FnMut(&K) -> Option<R>,
    {
        self.for_each(&mut |key, _| f(key))
    }

    pub fn for_each_value<R, F>(&self, f: &mut F) -> Option<R>
    where
        F: FnMut(&V) -> Option<R>,
    {
        self.for_each(&mut |_, value| f(value))
    }
}

impl<K: Clone, V: Clone, U: Clone> BTreePage<K, V, U> {
    /// Cursor over the entries in key order.
    pub fn entries(&self) -> PageCursor<Self> {
        CursorPage::cursor(self)
    }

    /// Cursor positioned after the last entry, for walking backwards.
    pub fn reverse_entries(&self) -> PageCursor<Self> {
        CursorPage::reverse_cursor(self)
    }
}

impl<K: Clone, V: Clone, U: Clone> CursorPage for BTreePage<K, V, U> {
    type Slot = (K, V);

    fn size(&self) -> usize {
        BTreePage::size(self)
    }

    fn cursor(&self) -> PageCursor<Self> {
        match self.repr.as_deref() {
            None => PageCursor::empty(),
            Some(BTreeKind::Leaf(leaf)) => PageCursor::Leaf(SlotCursor::new(leaf.slots.clone())),
            Some(BTreeKind::Node(node)) => {
                PageCursor::Node(NodeCursor::new(node.pages.clone(), node.size))
            }
        }
    }

    fn reverse_cursor(&self) -> PageCursor<Self> {
        match self.repr.as_deref() {
            None => PageCursor::empty(),
            Some(BTreeKind::Leaf(leaf)) => {
                PageCursor::Leaf(SlotCursor::at_end(leaf.slots.clone()))
            }
            Some(BTreeKind::Node(node)) => {
                PageCursor::Node(NodeCursor::at_end(node.pages.clone(), node.size))
            }
        }
    }

    fn rebuild_leaf(slots: Arc<Vec<(K, V)>>) -> Self {
        Self::leaf_from_arc(slots)
    }

    fn rebuild_node(pages: Vec<Self>) -> Self {
        let mut pages: Vec<Self> = pages.into_iter().filter(|page| !page.is_empty()).collect();
        match pages.len() {
            0 => Self::empty(),
            1 => pages.remove(0),
            _ => Self::from_node(BTreeNode::from_pages(pages)),
        }
    }
}
