//! Copy-on-write removal and merging for sequence pages.

use tracing::trace;

use super::types::{PageView, STreeNode, STreePage};
use crate::context::PageLimits;

impl<V: Clone, I: Clone, U: Clone> STreePage<V, I, U> {
    /// Page without the element at `index`.
    ///
    /// Returns this very page when `index` is out of range, and the canonical
    /// empty page when the last element goes.
    pub fn removed<C>(&self, index: usize, ctx: &C) -> Self
    where
        C: PageLimits + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) if index >= slots.len() => self.clone(),
            PageView::Leaf(slots) if slots.len() == 1 => Self::empty(),
            PageView::Leaf(slots) => {
                let mut slots = slots.to_vec();
                slots.remove(index);
                Self::leaf(slots)
            }
            PageView::Node(node) => {
                if index >= node.size {
                    return self.clone();
                }
                let (x, offset) = node.locate(index);
                let new = node.pages[x].removed(offset, ctx);
                node.replaced_page(x, new, ctx)
            }
        }
    }
}

impl<V: Clone, I: Clone, U: Clone> STreeNode<V, I, U> {
    /// This node with child `x` replaced by `new`, which may have shrunk,
    /// emptied, or widened by inlining a merged grandchild.
    pub(super) fn replaced_page<C>(&self, x: usize, new: STreePage<V, I, U>, ctx: &C) -> STreePage<V, I, U>
    where
        C: PageLimits + ?Sized,
    {
        if !new.is_empty() {
            if new.is_node() && ctx.page_should_merge(&new) {
                self.updated_page_merge(x, new)
            } else if ctx.page_should_split(&new) {
                self.updated_page_split(x, new)
            } else {
                self.updated_page(x, new)
            }
        } else if self.pages.len() > 2 {
            self.removed_page(x)
        } else if self.pages.len() == 2 {
            self.pages[1 - x].clone()
        } else {
            STreePage::empty()
        }
    }

    /// This node with child `x` replaced by the children of node `new`.
    pub(super) fn updated_page_merge(&self, x: usize, new: STreePage<V, I, U>) -> STreePage<V, I, U> {
        let PageView::Node(child) = new.view() else {
            return self.updated_page(x, new.clone());
        };
        trace!(child = x, inlined = child.pages.len(), "inlining undersized child node");

        let mut pages = Vec::with_capacity(self.pages.len() + child.pages.len() - 1);
        pages.extend_from_slice(&self.pages[..x]);
        pages.extend_from_slice(&child.pages);
        pages.extend_from_slice(&self.pages[x + 1..]);
        STreePage::from_node(STreeNode::from_pages(pages))
    }

    /// This node without child `x`.
    pub(super) fn removed_page(&self, x: usize) -> STreePage<V, I, U> {
        let mut pages = self.pages.clone();
        pages.remove(x);
        STreePage::from_node(STreeNode::from_pages(pages))
    }
}
