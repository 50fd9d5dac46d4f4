//! Validation and debugging utilities for ordered maps.
//!
//! Structural checks (ordering, knots, sizes) hold after every operation.
//! Shape checks (leaf and node arity against the context thresholds) hold
//! after every operation except [`BTree::edit_entries`], which adopts a
//! cursor's edits without rebalancing. Every non-root node stays between the
//! merge and split thresholds; only the root may be narrower.

use std::fmt::Debug;

use super::tree::BTree;
use super::types::{BTreePage, PageView};
use crate::context::{BTreeContext, PageArity};
use crate::error::{TreeError, TreeResult};

// ============================================================================
// PAGE CHECKS
// ============================================================================

impl<K, V, U> BTreePage<K, V, U> {
    /// Checks ordering, knots and sizes, with every key in `[lower, upper)`.
    /// Returns the number of entries found.
    fn check_structure<C>(&self, ctx: &C, lower: Option<&K>, upper: Option<&K>, is_root: bool) -> TreeResult<usize>
    where
        C: BTreeContext<K> + ?Sized,
    {
        let in_range = |key: &K| {
            lower.map_or(true, |lower| ctx.compare(lower, key).is_le())
                && upper.map_or(true, |upper| ctx.compare(key, upper).is_lt())
        };
        match self.view() {
            PageView::Leaf(slots) => {
                if slots.is_empty() && !is_root {
                    return Err(TreeError::data_integrity("Leaf check", "empty non-root leaf"));
                }
                if slots.is_empty() != self.is_empty() {
                    return Err(TreeError::data_integrity("Leaf check", "empty leaf is not the canonical empty page"));
                }
                if slots.windows(2).any(|pair| !ctx.compare(&pair[0].0, &pair[1].0).is_lt()) {
                    return Err(TreeError::data_integrity("Leaf check", "keys not strictly ascending"));
                }
                if !slots.iter().all(|(key, _)| in_range(key)) {
                    return Err(TreeError::data_integrity("Leaf check", "key outside its knot range"));
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
                for (x, page) in node.pages.iter().enumerate() {
                    if page.is_empty() {
                        return Err(TreeError::data_integrity("Node check", "empty child page"));
                    }
                    let child_lower = if x == 0 { lower } else { Some(&node.knots[x - 1]) };
                    let child_upper = node.knots.get(x).or(upper);
                    if x > 0 && ctx.compare(page.min_key(), &node.knots[x - 1]).is_ne() {
                        return Err(TreeError::data_integrity("Node check", "knot is not the minimum key of its child"));
                    }
                    size += page.check_structure(ctx, child_lower, child_upper, false)?;
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

    /// Checks leaf arities against the split threshold and non-root node
    /// arities against both the merge and split thresholds.
    fn check_shape<C>(&self, ctx: &C, is_root: bool) -> TreeResult<()>
    where
        C: BTreeContext<K> + ?Sized,
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

    /// Height of the tallest path, a lone leaf being 1.
    pub fn depth(&self) -> usize {
        match self.view() {
            PageView::Leaf(_) => 1,
            PageView::Node(node) => 1 + node.pages.iter().map(BTreePage::depth).max().unwrap_or(0),
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
        K: Debug,
    {
        let indent = "  ".repeat(depth);
        match self.view() {
            PageView::Leaf(slots) => {
                let keys: Vec<&K> = slots.iter().map(|(key, _)| key).collect();
                println!("{}Leaf[size={}, folded={}]: {:?}", indent, slots.len(), self.fold().is_some(), keys);
            }
            PageView::Node(node) => {
                println!(
                    "{}Node[size={}, folded={}]: knots={:?}",
                    indent,
                    node.size,
                    self.fold().is_some(),
                    node.knots
                );
                for page in &node.pages {
                    page.print_page(depth + 1);
                }
            }
        }
    }
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K, V, U, C: BTreeContext<K>> BTree<K, V, U, C> {
    /// Check if the tree maintains its structural invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check structural invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> TreeResult<()> {
        self.root
            .check_structure(self.context.as_ref(), None, None, true)
            .map(|_| ())
    }

    /// Check structural invariants and page arities.
    pub fn validate(&self) -> TreeResult<()> {
        self.check_invariants_detailed()?;
        self.root.check_shape(self.context.as_ref(), true)
    }

    /// Number of entries in every leaf, left to right.
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
        K: Debug,
    {
        println!("Page tree ({} entries, depth {}):", self.len(), self.depth());
        self.root.print_page(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::types::BTreeNode;
    use crate::context::OrdContext;

    fn leaf(keys: &[i32]) -> BTreePage<i32, ()> {
        BTreePage::leaf(keys.iter().map(|&k| (k, ())).collect())
    }

    #[test]
    fn test_detects_stale_knot() {
        let mut node = BTreeNode::from_pages(vec![leaf(&[1, 2]), leaf(&[5, 6])]);
        node.knots[0] = 4;
        let page = BTreePage::from_node(node);
        let err = page.check_structure(&OrdContext::default(), None, None, true).unwrap_err();
        assert!(err.to_string().contains("minimum key"), "{}", err);
    }

    #[test]
    fn test_detects_wrong_size() {
        let mut node = BTreeNode::from_pages(vec![leaf(&[1, 2]), leaf(&[5, 6])]);
        node.size = 3;
        let page = BTreePage::from_node(node);
        assert!(page.check_structure(&OrdContext::default(), None, None, true).is_err());
    }

    #[test]
    fn test_detects_unsorted_leaf() {
        let page = leaf(&[1, 3, 2]);
        assert!(page.check_structure(&OrdContext::default(), None, None, true).is_err());
    }

    #[test]
    fn test_detects_overfull_leaf() {
        let ctx = OrdContext::new(4).unwrap();
        let page = leaf(&[1, 2, 3, 4, 5]);
        assert!(page.check_structure(&ctx, None, None, true).is_ok());
        assert!(page.check_shape(&ctx, true).is_err());
    }

    #[test]
    fn test_detects_overwide_child_node() {
        let ctx = OrdContext::new(4).unwrap();
        let wide = BTreePage::from_node(BTreeNode::from_pages(
            (0..5).map(|k| leaf(&[k * 10, k * 10 + 1])).collect(),
        ));
        assert!(wide.check_shape(&ctx, true).is_ok(), "the root may be wide");

        let page = BTreePage::from_node(BTreeNode::from_pages(vec![wide, leaf(&[100, 101])]));
        let err = page.check_shape(&ctx, true).unwrap_err();
        assert!(err.to_string().contains("should have split"), "{}", err);
    }

    #[test]
    fn test_depth_and_leaf_sizes() {
        let page = BTreePage::from_node(BTreeNode::from_pages(vec![leaf(&[1, 2]), leaf(&[5, 6, 7])]));
        assert_eq!(page.depth(), 2);
        let mut sizes = Vec::new();
        page.collect_leaf_sizes(&mut sizes);
        assert_eq!(sizes, vec![2, 3]);
        assert_eq!(BTreePage::<i32, ()>::empty().depth(), 1);
    }
}
