//! Positional slicing of ordered map pages.

use super::types::{BTreeNode, BTreePage, PageView};
use crate::context::PageLimits;
use crate::search::locate;

impl<K: Clone, V: Clone, U: Clone> BTreePage<K, V, U> {
    /// Page without its first `lower` entries.
    ///
    /// Children entirely below `lower` are released by reference; the child
    /// straddling it is trimmed and spliced back.
    pub fn drop<C>(&self, lower: usize, ctx: &C) -> Self
    where
        C: PageLimits + ?Sized,
    {
        if lower == 0 {
            return self.clone();
        }
        if lower >= self.size() {
            return Self::empty();
        }
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[lower..].to_vec()),
            PageView::Node(node) => {
                let (x, sub) = locate(&node.pages, lower, Self::size);
                let kept = BTreeNode {
                    pages: node.pages[x..].to_vec(),
                    knots: node.knots[x..].to_vec(),
                    size: node.size - (lower - sub),
                    fold: None,
                };
                if sub == 0 {
                    return Self::from_node(kept);
                }
                let trimmed = kept.pages[0].drop(sub, ctx);
                kept.replaced_page(0, trimmed, ctx)
            }
        }
    }

    /// Page of its first `upper` entries.
    pub fn take<C>(&self, upper: usize, ctx: &C) -> Self
    where
        C: PageLimits + ?Sized,
    {
        if upper >= self.size() {
            return self.clone();
        }
        if upper == 0 {
            return Self::empty();
        }
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[..upper].to_vec()),
            PageView::Node(node) => {
                let (x, sub) = locate(&node.pages, upper, Self::size);
                if sub == 0 {
                    return Self::from_node(BTreeNode {
                        pages: node.pages[..x].to_vec(),
                        knots: node.knots[..x - 1].to_vec(),
                        size: upper,
                        fold: None,
                    });
                }
                let kept = BTreeNode {
                    pages: node.pages[..=x].to_vec(),
                    knots: node.knots[..x].to_vec(),
                    size: upper - sub + node.pages[x].size(),
                    fold: None,
                };
                let trimmed = kept.pages[x].take(sub, ctx);
                kept.replaced_page(x, trimmed, ctx)
            }
        }
    }
}
