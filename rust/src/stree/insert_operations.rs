//! Copy-on-write insertion, replacement and splitting for sequence pages.

use super::types::{PageView, STreeNode, STreePage};
use crate::context::{PageArity, PageLimits, STreeContext};

impl<V: Clone, I: Clone, U: Clone> STreePage<V, I, U> {
    /// Page with the value at `index` replaced, keeping its id.
    ///
    /// Returns this very page when the value is unchanged or `index` is out
    /// of range.
    pub fn updated(&self, index: usize, value: V) -> Self
    where
        V: PartialEq,
    {
        match self.view() {
            PageView::Leaf(slots) => match slots.get(index) {
                Some((_, current)) if *current != value => {
                    let mut slots = slots.to_vec();
                    slots[index].1 = value;
                    Self::leaf(slots)
                }
                _ => self.clone(),
            },
            PageView::Node(node) => {
                if index >= node.size {
                    return self.clone();
                }
                let (x, offset) = node.locate(index);
                let old = &node.pages[x];
                let new = old.updated(offset, value);
                if new.ptr_eq(old) {
                    self.clone()
                } else {
                    node.updated_page(x, new)
                }
            }
        }
    }

    /// Page with `value` inserted before position `index`, shifting later
    /// elements.
    ///
    /// Without an explicit `id` the context identifies the value.
    pub fn inserted<C>(&self, index: usize, value: V, id: Option<I>, ctx: &C) -> Self
    where
        C: STreeContext<V, I> + ?Sized,
    {
        let id = id.unwrap_or_else(|| ctx.identify(&value));
        self.inserted_slot(index, (id, value), ctx)
    }

    fn inserted_slot<C>(&self, index: usize, slot: (I, V), ctx: &C) -> Self
    where
        C: PageLimits + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) => {
                let mut slots = slots.to_vec();
                slots.insert(index.min(slots.len()), slot);
                Self::leaf(slots)
            }
            PageView::Node(node) => {
                let (x, offset) = node.locate(index.min(node.size));
                let new = node.pages[x].inserted_slot(offset, slot, ctx);
                if ctx.page_should_split(&new) {
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
        C: PageLimits + ?Sized,
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
        Self::from_node(STreeNode::from_pages(vec![left, right]))
    }

    /// Leaf slots `[0, x)`, or node children `[0, x]`.
    pub fn split_left(&self, x: usize) -> Self {
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[..x].to_vec()),
            PageView::Node(node) => Self::from_node(STreeNode::from_pages(node.pages[..=x].to_vec())),
        }
    }

    /// Leaf slots `[x, len)`, or node children `(x, len)`.
    pub fn split_right(&self, x: usize) -> Self {
        match self.view() {
            PageView::Leaf(slots) => Self::leaf(slots[x..].to_vec()),
            PageView::Node(node) => Self::from_node(STreeNode::from_pages(node.pages[x + 1..].to_vec())),
        }
    }
}

impl<V: Clone, I: Clone, U: Clone> STreeNode<V, I, U> {
    /// This node with child `x` replaced by the non-empty page `new`.
    pub(super) fn updated_page(&self, x: usize, new: STreePage<V, I, U>) -> STreePage<V, I, U> {
        let old_size = self.pages[x].size();
        let new_size = new.size();
        let mut knots = self.knots.clone();
        for knot in &mut knots[x..] {
            *knot = *knot - old_size + new_size;
        }
        let mut pages = self.pages.clone();
        pages[x] = new;
        STreePage::from_node(STreeNode {
            pages,
            knots,
            size: self.size - old_size + new_size,
            fold: None,
        })
    }

    /// This node with child `x` replaced by both halves of `new`.
    pub(super) fn updated_page_split(&self, x: usize, new: STreePage<V, I, U>) -> STreePage<V, I, U> {
        let mid = new.split_point();
        let mut pages = self.pages.clone();
        pages[x] = new.split_left(mid);
        pages.insert(x + 1, new.split_right(mid));
        STreePage::from_node(STreeNode::from_pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SequenceContext;

    fn values(page: &STreePage<i32>) -> Vec<i32> {
        (0..page.size()).filter_map(|i| page.get(i).copied()).collect()
    }

    #[test]
    fn test_insert_at_front_reverses() {
        let ctx = SequenceContext::default();
        let mut page = STreePage::empty();
        for value in 1..=5 {
            page = page.inserted(0, value, None, &ctx).balanced(&ctx);
        }
        assert_eq!(values(&page), vec![5, 4, 3, 2, 1]);
        let ids: Vec<u64> = (0..5).filter_map(|i| page.get_id(i).copied()).collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_inserts_split_pages() {
        let ctx = SequenceContext::new(4).unwrap();
        let mut page = STreePage::empty();
        let mut reference = Vec::new();
        for value in 0..60 {
            let index = (value as usize * 7) % (reference.len() + 1);
            reference.insert(index, value);
            page = page.inserted(index, value, None, &ctx).balanced(&ctx);
        }
        assert!(page.is_node());
        assert_eq!(values(&page), reference);
    }

    #[test]
    fn test_updated_keeps_id_and_identity() {
        let ctx = SequenceContext::new(4).unwrap();
        let mut page: STreePage<i32> = STreePage::empty();
        for value in 0..20 {
            page = page.inserted(value as usize, value, Some(100 + value as u64), &ctx).balanced(&ctx);
        }
        assert!(page.updated(7, 7).ptr_eq(&page));
        assert!(page.updated(99, 0).ptr_eq(&page));

        let changed = page.updated(7, -7);
        assert_eq!(changed.get_entry(7), Some((&107, &-7)));
        assert_eq!(page.get(7), Some(&7));
    }
}
