//! Cached folds over sequence pages.

use super::types::{STreeKind, STreeLeaf, STreeNode, STreePage};

impl<V: Clone, I: Clone, U: Clone> STreePage<V, I, U> {
    /// Page whose every level carries its fold of the values in sequence
    /// order. See [`BTreePage::reduced`](crate::BTreePage::reduced).
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
            Some(STreeKind::Leaf(leaf)) => {
                let fold = leaf
                    .slots
                    .iter()
                    .fold(identity.clone(), |acc, (_, value)| accumulator(acc, value));
                Self::from_kind(STreeKind::Leaf(STreeLeaf {
                    slots: leaf.slots.clone(),
                    fold: Some(fold),
                }))
            }
            Some(STreeKind::Node(node)) => {
                let pages: Vec<Self> = node
                    .pages
                    .iter()
                    .map(|page| page.reduced(identity, accumulator, combiner))
                    .collect();
                let fold = pages.iter().fold(identity.clone(), |acc, page| {
                    combiner(acc, page.fold().unwrap_or(identity))
                });
                Self::from_node(STreeNode {
                    pages,
                    knots: node.knots.clone(),
                    size: node.size,
                    fold: Some(fold),
                })
            }
        }
    }
}
