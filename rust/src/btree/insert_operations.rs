//! Copy-on-write insertion and splitting for ordered map pages.

use super::types::{BTreeNode, BTreePage, PageView};
use crate::context::{BTreeContext, PageArity};
use crate::search::{child_index, search_knots, search_slots};

impl<K: Clone, V: Clone, U: Clone> BTreePage<K, V, U> {
    /// Page with `key` bound to `value`.
    ///
    /// Returns this very page when `key` is already bound to an equal value.
    /// A child that grew past the split threshold is split once, at this level;
    /// growing the root is left to [`balanced`](Self::balanced).
    pub fn updated<C>(&self, key: K, value: V, ctx: &C) -> Self
    where
        V: PartialEq,
        C: BTreeContext<K> + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) => match search_slots(slots, &key, ctx) {
                Ok(i) if slots[i].1 == value => self.clone(),
                Ok(i) => {
                    let mut slots = slots.to_vec();
                    slots[i].1 = value;
                    Self::leaf(slots)
                }
                Err(i) => {
                    let mut slots = slots.to_vec();
                    slots.insert(i, (key, value));
                    Self::leaf(slots)
                }
            },
            PageView::Node(node) => {
                let x = child_index(search_knots(&node.knots, &key, ctx));
                let old = &node.pages[x];
                let new = old.updated(key, value, ctx);
                if new.ptr_eq(old) {
                    self.clone()
                } else if new.size() != old.size() && ctx.page_should_split(&new) {
                    node.updated_page_split(x, new)
                } else {
                    node.updated_page(x, new)
                }
            }
        }
    }

    /// Splits this page under a new node when it has outgrown the threshold.
    pub fn balanced<C>(&self, ctx: &C) -> Self
    where
        C: BTreeContext<K> + ?Sized,
    {
        if self.arity() > 1 && ctx.page_should_split(self) {
            self.split(self.split_point())
        } else {
            self.clone()
        }
    }

    /// Node of two children: `split_left(x)` and `split_right(x)`.
    pub fn split(&self, x: usize) -> Self {
        let left = self.split_left(x);
        let right = self.split_right(x);
        let size = left.size() + right.size();
        let knots = vec![right.min_key().clone()];
        Self::from_node(BTreeNode {
            pages: vec![left, right],
            knots,
            size,
            fold: None,
        })
    }

    /// Leaf slots `[0, x)`, or node children `[0, x]`.
    pub fn split_left(&self, x: usize) -> Self {
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[..x].to_vec()),
            PageView::Node(node) => {
                let pages = node.pages[..=x].to_vec();
                let size = pages.iter().map(Self::size).sum();
                Self::from_node(BTreeNode {
                    pages,
                    knots: node.knots[..x].to_vec(),
                    size,
                    fold: None,
                })
            }
        }
    }

    /// Leaf slots `[x, len)`, or node children `(x, len)`.
    pub fn split_right(&self, x: usize) -> Self {
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[x..].to_vec()),
            PageView::Node(node) => {
                let pages = node.pages[x + 1..].to_vec();
                let size = pages.iter().map(Self::size).sum();
                Self::from_node(BTreeNode {
                    pages,
                    knots: node.knots[x + 1..].to_vec(),
                    size,
                    fold: None,
                })
            }
        }
    }
}

impl<K: Clone, V: Clone, U: Clone> BTreeNode<K, V, U> {
    /// This node with child `x` replaced by the non-empty page `new`.
    pub(super) fn updated_page(&self, x: usize, new: BTreePage<K, V, U>) -> BTreePage<K, V, U> {
        let size = self.size - self.pages[x].size() + new.size();
        let mut knots = self.knots.clone();
        if x > 0 {
            knots[x - 1] = new.min_key().clone();
        }
        let mut pages = self.pages.clone();
        pages[x] = new;
        BTreePage::from_node(BTreeNode {
            pages,
            knots,
            size,
            fold: None,
        })
    }

    /// This node with child `x` replaced by both halves of `new`.
    pub(super) fn updated_page_split(&self, x: usize, new: BTreePage<K, V, U>) -> BTreePage<K, V, U> {
        let mid = new.split_point();
        let left = new.split_left(mid);
        let right = new.split_right(mid);
        let size = self.size - self.pages[x].size() + new.size();

        let mut knots = self.knots.clone();
        if x > 0 {
            knots[x - 1] = left.min_key().clone();
        }
        knots.insert(x, right.min_key().clone());

        let mut pages = self.pages.clone();
        pages[x] = left;
        pages.insert(x + 1, right);
        BTreePage::from_node(BTreeNode {
            pages,
            knots,
            size,
            fold: None,
        })
    }
}
