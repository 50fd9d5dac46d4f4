//! Cached folds over ordered map pages.

use super::types::{BTreeKind, BTreeLeaf, BTreeNode, BTreePage};

impl<K: Clone, V: Clone, U: Clone> BTreePage<K, V, U> {
    /// Page whose every level carries its fold of the values in key order.
    ///
    /// Leaves fold their values through `accumulator`, starting from
    /// `identity`; nodes combine their children's folds left to right through
    /// `combiner`. Neither callback has to be commutative. Pages that already
    /// carry a fold are reused as they are, so after a point update only the
    /// rebuilt path is folded again.
    ///
    /// A fold cached by earlier callbacks is trusted: folding one tree with two
    /// different callback sets needs two separately built trees.
    pub fn reduced<A, B>(&self, identity: &U, accumulator: &A, combiner: &B) -> Self
    where
        A: Fn(U, &V) -> U,
        B: Fn(U, &U) -> U,
    {
        if self.fold().is_some() {
            return self.clone();
        }
        match self.repr.as_deref() {
            None => self.clone(),
            Some(BTreeKind::Leaf(leaf)) => {
                let fold = leaf
                    .slots
                    .iter()
                    .fold(identity.clone(), |acc, (_, value)| accumulator(acc, value));
                Self::from_kind(BTreeKind::Leaf(BTreeLeaf {
                    slots: leaf.slots.clone(),
                    fold: Some(fold),
                }))
            }
            Some(BTreeKind::Node(node)) => {
                let pages: Vec<Self> = node
                    .pages
                    .iter()
                    .map(|page| page.reduced(identity, accumulator, combiner))
                    .collect();
                let fold = pages.iter().fold(identity.clone(), |acc, page| {
                    combiner(acc, page.fold().unwrap_or(identity))
                });
                Self::from_node(BTreeNode {
                    pages,
                    knots: node.knots.clone(),
                    size: node.size,
                    fold: Some(fold),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OrdContext;

    fn build(n: i32, ctx: &OrdContext) -> BTreePage<i32, i32, String> {
        let mut page = BTreePage::empty();
        for key in 0..n {
            page = page.updated(key, key, ctx).balanced(ctx);
        }
        page
    }

    fn concat(page: &BTreePage<i32, i32, String>) -> BTreePage<i32, i32, String> {
        page.reduced(
            &String::new(),
            &|acc, value| format!("{}{},", acc, value),
            &|acc, fold| acc + fold,
        )
    }

    #[test]
    fn test_fold_preserves_order() {
        let ctx = OrdContext::new(4).unwrap();
        let page = concat(&build(20, &ctx));
        let expected: String = (0..20).map(|k| format!("{},", k)).collect();
        assert_eq!(page.fold(), Some(&expected));
    }

    #[test]
    fn test_fold_is_cached() {
        let ctx = OrdContext::new(4).unwrap();
        let folded = concat(&build(20, &ctx));
        assert!(concat(&folded).ptr_eq(&folded));
    }

    #[test]
    fn test_update_clears_fold_on_path_only() {
        let ctx = OrdContext::new(4).unwrap();
        let folded = concat(&build(20, &ctx));
        let updated = folded.updated(19, 190, &ctx);
        assert!(updated.fold().is_none());

        let refolded = concat(&updated);
        let expected: String = (0..19).map(|k| format!("{},", k)).collect::<String>() + "190,";
        assert_eq!(refolded.fold(), Some(&expected));
    }

    #[test]
    fn test_empty_page_has_no_fold() {
        let empty: BTreePage<i32, i32, String> = BTreePage::empty();
        assert!(concat(&empty).is_empty());
        assert!(concat(&empty).fold().is_none());
    }
}
