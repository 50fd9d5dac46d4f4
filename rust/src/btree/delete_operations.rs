//! Copy-on-write removal and merging for ordered map pages.

use tracing::trace;

use super::types::{BTreeNode, BTreePage, PageView};
use crate::context::{BTreeContext, PageLimits};
use crate::search::{child_index, search_knots, search_slots};

impl<K: Clone, V: Clone, U: Clone> BTreePage<K, V, U> {
    /// Page without `key`.
    ///
    /// Returns this very page when `key` is absent, and the canonical empty page
    /// when `key` was the last entry.
    pub fn removed<C>(&self, key: &K, ctx: &C) -> Self
    where
        C: BTreeContext<K> + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) => match search_slots(slots, key, ctx) {
                Ok(_) if slots.len() == 1 => Self::empty(),
                Ok(i) => {
                    let mut slots = slots.to_vec();
                    slots.remove(i);
                    Self::leaf(slots)
                }
                Err(_) => self.clone(),
            },
            PageView::Node(node) => {
                let x = child_index(search_knots(&node.knots, key, ctx));
                let old = &node.pages[x];
                let new = old.removed(key, ctx);
                if new.ptr_eq(old) {
                    self.clone()
                } else {
                    node.replaced_page(x, new, ctx)
                }
            }
        }
    }
}

impl<K: Clone, V: Clone, U: Clone> BTreeNode<K, V, U> {
    /// This node with child `x` replaced by `new`, which may have shrunk or
    /// emptied.
    ///
    /// An empty child is spliced out (or the node collapses to its remaining
    /// child or to the empty page). A child node small enough to merge has its
    /// own children inlined here; a child widened past the split threshold by
    /// such an inlining is split in two.
    pub(super) fn replaced_page<C>(&self, x: usize, new: BTreePage<K, V, U>, ctx: &C) -> BTreePage<K, V, U>
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
            BTreePage::empty()
        }
    }

    /// This node with child `x` replaced by the children of node `new`.
    pub(super) fn updated_page_merge(&self, x: usize, new: BTreePage<K, V, U>) -> BTreePage<K, V, U> {
        let PageView::Node(child) = new.view() else {
            return self.updated_page(x, new.clone());
        };
        trace!(child = x, inlined = child.pages.len(), "inlining undersized child node");

        let mut knots = Vec::with_capacity(self.knots.len() + child.knots.len());
        if x > 0 {
            knots.extend_from_slice(&self.knots[..x - 1]);
            knots.push(child.pages[0].min_key().clone());
        }
        knots.extend_from_slice(&child.knots);
        knots.extend_from_slice(&self.knots[x..]);

        let mut pages = Vec::with_capacity(self.pages.len() + child.pages.len() - 1);
        pages.extend_from_slice(&self.pages[..x]);
        pages.extend_from_slice(&child.pages);
        pages.extend_from_slice(&self.pages[x + 1..]);

        let size = self.size - self.pages[x].size() + child.size;
        BTreePage::from_node(BTreeNode {
            pages,
            knots,
            size,
            fold: None,
        })
    }

    /// This node without child `x`.
    pub(super) fn removed_page(&self, x: usize) -> BTreePage<K, V, U> {
        let mut pages = self.pages.clone();
        let removed = pages.remove(x);
        let mut knots = self.knots.clone();
        knots.remove(x.saturating_sub(1));
        BTreePage::from_node(BTreeNode {
            pages,
            knots,
            size: self.size - removed.size(),
            fold: None,
        })
    }
}
