//! Validation and debugging utilities for indexed sequences.

use std::fmt::Debug;

use super::tree::STree;
use super::types::{PageView, STreePage};
use crate::context::{PageArity, PageLimits};
use crate::error::{TreeError, TreeResult};
use crate::search::cumulative_knots;

impl<V, I, U> STreePage<V, I, U> {
    /// Checks knots and sizes, returning the number of elements found.
    fn check_structure(&self, is_root: bool) -> TreeResult<usize> {
        match self.view() {
            PageView::Leaf(slots) => {
                if slots.is_empty() && !is_root {
                    return Err(TreeError::data_integrity("Leaf check", "empty non-root leaf"));
                }
                if slots.is_empty() != self.is_empty() {
                    return Err(TreeError::data_integrity("Leaf check", "empty leaf is not the canonical empty page"));
                }
                Ok(slots.len())
            }
            PageView::Node(node) => {
                if node.pages.is_empty() || node.knots.len() + 1 != node.pages.len() {
                    return Err(TreeError::data_integrity(
                        "Node check",
                        &format!("{} pages with {} knots", node.pages.len(), node.knots.len()),
                    ));
                }
                let mut size = 0;
                for page in &node.pages {
                    if page.is_empty() {
                        return Err(TreeError::data_integrity("Node check", "empty child page"));
                    }
                    size += page.check_structure(false)?;
                }
                if node.knots != cumulative_knots(&node.pages, STreePage::size) {
                    return Err(TreeError::data_integrity(
                        "Node check",
                        &format!("knots {:?} are not the cumulative child sizes", node.knots),
                    ));
                }
                if size != node.size {
                    return Err(TreeError::data_integrity(
                        "Node check",
                        &format!("cached size {} but children hold {}", node.size, size),
                    ));
                }
                Ok(size)
            }
        }
    }

    fn check_shape<C>(&self, ctx: &C, is_root: bool) -> TreeResult<()>
    where
        C: PageLimits + ?Sized,
    {
        match self.view() {
            PageView::Leaf(_) if ctx.page_should_split(self) => Err(TreeError::data_integrity(
                "Shape check",
                &format!("leaf of arity {} should have split", self.arity()),
            )),
            PageView::Leaf(_) => Ok(()),
            PageView::Node(node) => {
                if !is_root && ctx.page_should_merge(self) {
                    return Err(TreeError::data_integrity(
                        "Shape check",
                        &format!("non-root node of arity {} should have merged", self.arity()),
                    ));
                }
                if !is_root && ctx.page_should_split(self) {
                    return Err(TreeError::data_integrity(
                        "Shape check",
                        &format!("non-root node of arity {} should have split", self.arity()),
                    ));
                }
                node.pages.iter().try_for_each(|page| page.check_shape(ctx, false))
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self.view() {
            PageView::Leaf(_) => 1,
            PageView::Node(node) => 1 + node.pages.iter().map(STreePage::depth).max().unwrap_or(0),
        }
    }

    fn collect_node_arities(&self, is_root: bool, arities: &mut Vec<usize>) {
        if let PageView::Node(node) = self.view() {
            if !is_root {
                arities.push(node.pages.len());
            }
            for page in &node.pages {
                page.collect_node_arities(false, arities);
            }
        }
    }

    fn collect_leaf_sizes(&self, sizes: &mut Vec<usize>) {
        match self.view() {
            PageView::Leaf(slots) => sizes.push(slots.len()),
            PageView::Node(node) => node.pages.iter().for_each(|page| page.collect_leaf_sizes(sizes)),
        }
    }

    fn print_page(&self, depth: usize)
    where
        I: Debug,
    {
        let indent = "  ".repeat(depth);
        match self.view() {
            PageView::Leaf(slots) => {
                let ids: Vec<&I> = slots.iter().map(|(id, _)| id).collect();
                println!("{}Leaf[size={}]: ids={:?}", indent, slots.len(), ids);
            }
            PageView::Node(node) => {
                println!("{}Node[size={}]: knots={:?}", indent, node.size, node.knots);
                for page in &node.pages {
                    page.print_page(depth + 1);
                }
            }
        }
    }
}

impl<V, I, U, C: PageLimits> STree<V, I, U, C> {
    /// Check if the sequence maintains its structural invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check structural invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> TreeResult<()> {
        self.root.check_structure(true).map(|_| ())
    }

    /// Check structural invariants and page arities.
    pub fn validate(&self) -> TreeResult<()> {
        self.check_invariants_detailed()?;
        self.root.check_shape(self.context.as_ref(), true)
    }

    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        self.root.collect_leaf_sizes(&mut sizes);
        sizes
    }

    /// Number of children of every non-root node, in pre-order.
    pub fn node_arities(&self) -> Vec<usize> {
        let mut arities = Vec::new();
        self.root.collect_node_arities(true, &mut arities);
        arities
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Print the page structure for debugging.
    pub fn print_page_tree(&self)
    where
        I: Debug,
    {
        println!("Page tree ({} elements, depth {}):", self.len(), self.depth());
        self.root.print_page(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stree::types::STreeNode;

    fn leaf(n: u64) -> STreePage<(), u64> {
        STreePage::leaf((0..n).map(|id| (id, ())).collect())
    }

    #[test]
    fn test_detects_stale_knots() {
        let mut node = STreeNode::from_pages(vec![leaf(2), leaf(3)]);
        node.knots[0] = 3;
        let err = STreePage::from_node(node).check_structure(true).unwrap_err();
        assert!(err.to_string().contains("cumulative"), "{}", err);
    }

    #[test]
    fn test_detects_empty_child() {
        let node = STreeNode::from_pages(vec![leaf(2), STreePage::empty()]);
        assert!(STreePage::from_node(node).check_structure(true).is_err());
    }

    #[test]
    fn test_detects_overwide_child_node() {
        let ctx = crate::context::SequenceContext::new(4).unwrap();
        let wide = STreePage::from_node(STreeNode::from_pages((0..6).map(|_| leaf(2)).collect()));
        assert!(wide.check_shape(&ctx, true).is_ok());

        let page = STreePage::from_node(STreeNode::from_pages(vec![wide, leaf(2)]));
        let err = page.check_shape(&ctx, true).unwrap_err();
        assert!(err.to_string().contains("should have split"), "{}", err);
        assert_eq!(page.check_structure(true), Ok(14));
    }

    #[test]
    fn test_accepts_consistent_node() {
        let page = STreePage::from_node(STreeNode::from_pages(vec![leaf(2), leaf(3)]));
        assert_eq!(page.check_structure(true), Ok(5));
        assert_eq!(page.depth(), 2);
    }
}
