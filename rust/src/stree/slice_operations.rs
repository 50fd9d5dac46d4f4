//! Positional slicing of sequence pages.

use super::types::{PageView, STreeNode, STreePage};
use crate::context::PageLimits;

impl<V: Clone, I: Clone, U: Clone> STreePage<V, I, U> {
    /// Page without its first `lower` elements.
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
                let (x, sub) = node.locate(lower);
                let kept = STreeNode::from_pages(node.pages[x..].to_vec());
                if sub == 0 {
                    return Self::from_node(kept);
                }
                let trimmed = kept.pages[0].drop(sub, ctx);
                kept.replaced_page(0, trimmed, ctx)
            }
        }
    }

    /// Page of its first `upper` elements.
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
                let (x, sub) = node.locate(upper);
                if sub == 0 {
                    return Self::from_node(STreeNode::from_pages(node.pages[..x].to_vec()));
                }
                let kept = STreeNode::from_pages(node.pages[..=x].to_vec());
                let trimmed = kept.pages[x].take(sub, ctx);
                kept.replaced_page(x, trimmed, ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SequenceContext;

    fn build(n: i32, ctx: &SequenceContext) -> STreePage<i32> {
        let mut page = STreePage::empty();
        for value in 0..n {
            page = page.inserted(value as usize, value, None, ctx).balanced(ctx);
        }
        page
    }

    fn values(page: &STreePage<i32>) -> Vec<i32> {
        (0..page.size()).filter_map(|i| page.get(i).copied()).collect()
    }

    #[test]
    fn test_drop_then_take() {
        let ctx = SequenceContext::new(4).unwrap();
        let page = build(10, &ctx);
        assert_eq!(values(&page.drop(3, &ctx).take(2, &ctx)), vec![3, 4]);
    }

    #[test]
    fn test_every_slice_matches_reference() {
        let ctx = SequenceContext::new(4).unwrap();
        let n = 45;
        let page = build(n, &ctx);
        let all: Vec<i32> = (0..n).collect();
        for a in 0..=n as usize {
            let dropped = page.drop(a, &ctx);
            for b in 0..=(n as usize - a) {
                let sliced = dropped.take(b, &ctx);
                assert_eq!(sliced.size(), b);
                assert_eq!(values(&sliced), all[a..a + b].to_vec(), "drop({}).take({})", a, b);
            }
        }
    }

    #[test]
    fn test_slices_share_untouched_children() {
        let ctx = SequenceContext::new(4).unwrap();
        let page = build(40, &ctx);
        assert!(page.drop(0, &ctx).ptr_eq(&page));
        assert!(page.take(40, &ctx).ptr_eq(&page));
        assert!(page.take(0, &ctx).is_empty());
        assert!(page.drop(40, &ctx).is_empty());
    }
}
