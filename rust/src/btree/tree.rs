//! The ordered map facade.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::types::BTreePage;
use crate::context::{BTreeContext, OrdContext};
use crate::cursor::{KeyCursor, PageCursor, ValueCursor};
use crate::error::InitResult;

/// Cursor over the `(key, value)` entries of a [`BTree`].
pub type BTreeCursor<K, V, U = ()> = PageCursor<BTreePage<K, V, U>>;

/// A persistent ordered map.
///
/// `BTree` holds a root [`BTreePage`] and a shared context. Mutating methods
/// (`set`, `delete`, `drop`, `take`, `clear`) swap the root for a newly built
/// page; pure variants (`updated`, `removed`, `cleared`) return a new map
/// sharing the context. Cloning is O(1) and every clone is an independent
/// snapshot.
///
/// `U` is the type of the cached fold computed by [`reduced`](Self::reduced).
///
/// # Examples
///
/// ```
/// use pagetree::BTree;
///
/// let mut map = BTree::new();
/// map.set(3, "c").set(1, "a").set(2, "b");
///
/// let snapshot = map.clone();
/// map.delete(&2);
///
/// assert_eq!(map.get(&2), None);
/// assert_eq!(snapshot.get(&2), Some(&"b"));
/// assert_eq!(map.first_key(), Some(&1));
/// ```
pub struct BTree<K, V, U = (), C = OrdContext> {
    pub(super) root: BTreePage<K, V, U>,
    pub(super) context: Arc<C>,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl<K, V> BTree<K, V> {
    /// Creates an empty map ordered by `K: Ord`.
    pub fn new() -> Self {
        Self::with_context(OrdContext::default())
    }

    /// Creates an empty map whose pages split above `page_split_size` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetree::BTree;
    ///
    /// let map: BTree<i32, i32> = BTree::with_page_split_size(8).unwrap();
    /// assert!(map.is_empty());
    /// assert!(BTree::<i32, i32>::with_page_split_size(1).is_err());
    /// ```
    pub fn with_page_split_size(page_split_size: usize) -> InitResult<Self> {
        Ok(Self::with_context(OrdContext::new(page_split_size)?))
    }
}

impl<K, V, U, C> BTree<K, V, U, C> {
    /// Creates an empty map using `context` for ordering and page limits.
    pub fn with_context(context: C) -> Self {
        Self {
            root: BTreePage::empty(),
            context: Arc::new(context),
        }
    }

    /// Wraps an existing root page.
    pub fn from_root(root: BTreePage<K, V, U>, context: Arc<C>) -> Self {
        Self { root, context }
    }

    pub fn root(&self) -> &BTreePage<K, V, U> {
        &self.root
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.root.size()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns true when both maps share the same root page.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
    }

    /// Fold cached on the root by the last [`reduced`](Self::reduced), if any
    /// update since has not discarded it.
    pub fn fold(&self) -> Option<&U> {
        self.root.fold()
    }

    /// Visits entries in key order until `f` returns a value.
    pub fn for_each<R>(&self, mut f: impl FnMut(&K, &V) -> Option<R>) -> Option<R> {
        self.root.for_each(&mut f)
    }

    pub fn for_each_key<R>(&self, mut f: impl FnMut(&K) -> Option<R>) -> Option<R> {
        self.root.for_each_key(&mut f)
    }

    pub fn for_each_value<R>(&self, mut f: impl FnMut(&V) -> Option<R>) -> Option<R> {
        self.root.for_each_value(&mut f)
    }

    /// Entry at position `index` in key order.
    pub fn get_entry(&self, index: usize) -> Option<(&K, &V)> {
        self.root.get_entry(index)
    }

    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.root.first_entry()
    }

    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.root.last_entry()
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

impl<K, V, U, C: BTreeContext<K>> BTree<K, V, U, C> {
    pub fn contains_key(&self, key: &K) -> bool {
        self.root.contains_key(key, self.context.as_ref())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.root.get(key, self.context.as_ref())
    }

    /// Entry with the smallest key strictly greater than `key`.
    pub fn next_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.root.next_entry(key, self.context.as_ref())
    }

    /// Entry with the largest key strictly less than `key`.
    pub fn previous_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.root.previous_entry(key, self.context.as_ref())
    }

    entry_projections! {
        first();
        last();
        next(key: &K);
        previous(key: &K);
    }
}

// ============================================================================
// UPDATES
// ============================================================================

impl<K: Clone, V: Clone, U: Clone, C: BTreeContext<K>> BTree<K, V, U, C> {
    /// Binds `key` to `value`.
    ///
    /// Leaves the root untouched when `key` is already bound to an equal value.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.set("a", 1);
    /// let before = map.clone();
    /// map.set("a", 1);
    /// assert!(map.ptr_eq(&before));
    /// ```
    pub fn set(&mut self, key: K, value: V) -> &mut Self
    where
        V: PartialEq,
    {
        let ctx = self.context.as_ref();
        let root = self.root.updated(key, value, ctx);
        self.root = if root.size() > self.root.size() {
            let balanced = root.balanced(ctx);
            if !balanced.ptr_eq(&root) {
                trace!(len = balanced.size(), depth = balanced.depth(), "root page split");
            }
            balanced
        } else {
            root
        };
        self
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// A root widened by inlining a merged child is split like an overfull
    /// one.
    pub fn delete(&mut self, key: &K) -> bool {
        let ctx = self.context.as_ref();
        let root = self.root.removed(key, ctx);
        if root.ptr_eq(&self.root) {
            return false;
        }
        if root.is_empty() {
            trace!("map collapsed to the empty page");
        }
        self.root = root.balanced(ctx);
        true
    }

    /// Removes the first `lower` entries.
    pub fn drop(&mut self, lower: usize) -> &mut Self {
        self.root = self.root.drop(lower, self.context.as_ref());
        self
    }

    /// Keeps only the first `upper` entries.
    pub fn take(&mut self, upper: usize) -> &mut Self {
        self.root = self.root.take(upper, self.context.as_ref());
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.root = BTreePage::empty();
        self
    }

    /// Map with `key` bound to `value`, leaving this one untouched.
    pub fn updated(&self, key: K, value: V) -> Self
    where
        V: PartialEq,
    {
        let mut map = self.clone();
        map.set(key, value);
        map
    }

    /// Map without `key`, leaving this one untouched.
    pub fn removed(&self, key: &K) -> Self {
        let mut map = self.clone();
        map.delete(key);
        map
    }

    /// Empty map sharing this map's context.
    pub fn cleared(&self) -> Self {
        Self::from_root(BTreePage::empty(), self.context.clone())
    }

    /// Folds all values in key order, caching the fold on every page.
    ///
    /// `accumulator` folds a leaf's values starting from `identity`;
    /// `combiner` joins child folds left to right. Pages untouched since the
    /// previous call keep their fold, so repeated calls after small updates
    /// only recompute the rebuilt paths. An empty map folds to `identity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetree::{BTree, OrdContext};
    ///
    /// let mut map: BTree<i32, i32, i64> = BTree::with_context(OrdContext::default());
    /// for key in 0..100 {
    ///     map.set(key, key);
    /// }
    /// let sum = map.reduced(0, |acc, value| acc + *value as i64, |acc, fold| acc + fold);
    /// assert_eq!(sum, 4950);
    /// ```
    pub fn reduced<A, B>(&mut self, identity: U, accumulator: A, combiner: B) -> U
    where
        A: Fn(U, &V) -> U,
        B: Fn(U, &U) -> U,
    {
        self.root = self.root.reduced(&identity, &accumulator, &combiner);
        self.root.fold().cloned().unwrap_or(identity)
    }

    /// Runs `f` over a cursor of this map's entries and adopts its edits.
    ///
    /// Cursor edits are copy-on-write: they never touch pages shared with
    /// other snapshots. The edited pages are adopted as they are, without
    /// rebalancing, and replacing a key must keep the keys ordered.
    pub fn edit_entries<R>(&mut self, f: impl FnOnce(&mut BTreeCursor<K, V, U>) -> R) -> R {
        let mut cursor = self.root.entries();
        let result = f(&mut cursor);
        if cursor.is_edited() {
            self.root = cursor.into_page();
        }
        result
    }
}

// ============================================================================
// CURSORS
// ============================================================================

impl<K: Clone, V: Clone, U: Clone, C> BTree<K, V, U, C> {
    /// Cursor over the entries in key order.
    pub fn entries(&self) -> BTreeCursor<K, V, U> {
        self.root.entries()
    }

    /// Cursor positioned after the last entry, for walking backwards.
    pub fn reverse_entries(&self) -> BTreeCursor<K, V, U> {
        self.root.reverse_entries()
    }

    pub fn keys(&self) -> KeyCursor<BTreeCursor<K, V, U>> {
        KeyCursor::new(self.entries())
    }

    pub fn reverse_keys(&self) -> KeyCursor<BTreeCursor<K, V, U>> {
        KeyCursor::new(self.reverse_entries())
    }

    pub fn values(&self) -> ValueCursor<BTreeCursor<K, V, U>> {
        ValueCursor::new(self.entries())
    }

    pub fn reverse_values(&self) -> ValueCursor<BTreeCursor<K, V, U>> {
        ValueCursor::new(self.reverse_entries())
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl<K, V, U, C> Clone for BTree<K, V, U, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            context: self.context.clone(),
        }
    }
}

impl<K, V, U, C: Default> Default for BTree<K, V, U, C> {
    fn default() -> Self {
        Self::with_context(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, U, C> fmt::Debug for BTree<K, V, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.for_each(|key, value| {
            map.entry(key, value);
            None::<()>
        });
        map.finish()
    }
}

impl<K: PartialEq, V: PartialEq, U, C> PartialEq for BTree<K, V, U, C> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && {
                let (mine, theirs) = (self.root.leaf_runs(), other.root.leaf_runs());
                mine.iter().flat_map(|run| run.iter()).eq(theirs.iter().flat_map(|run| run.iter()))
            })
    }
}

impl<K, V> FromIterator<(K, V)> for BTree<K, V>
where
    K: Ord + Clone,
    V: Clone + PartialEq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, U, C> Extend<(K, V)> for BTree<K, V, U, C>
where
    K: Clone,
    V: Clone + PartialEq,
    U: Clone,
    C: BTreeContext<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ComparatorContext;
    use crate::cursor::Cursor;

    #[test]
    fn test_set_get_delete() {
        let mut map = BTree::with_page_split_size(4).unwrap();
        for key in [5, 3, 8, 1, 4, 7, 2, 6] {
            map.set(key, key * 10);
        }
        assert_eq!(map.len(), 8);
        assert!(map.root().is_node());
        assert_eq!(map.get(&4), Some(&40));
        assert!(map.contains_key(&8));
        assert!(map.delete(&4));
        assert!(!map.delete(&4));
        assert_eq!(map.get(&4), None);
        assert_eq!(map.len(), 7);
        map.validate().unwrap();
    }

    #[test]
    fn test_projections() {
        let map: BTree<i32, char> = [(1, 'a'), (3, 'c'), (5, 'e')].into_iter().collect();
        assert_eq!(map.first_key(), Some(&1));
        assert_eq!(map.last_value(), Some(&'e'));
        assert_eq!(map.next_key(&3), Some(&5));
        assert_eq!(map.next_value(&2), Some(&'c'));
        assert_eq!(map.previous_key(&3), Some(&1));
        assert_eq!(map.previous_value(&1), None);
    }

    #[test]
    fn test_pure_variants_share_context() {
        let map: BTree<i32, i32> = (0..10).map(|k| (k, k)).collect();
        let updated = map.updated(20, 20);
        let removed = map.removed(&3);
        let cleared = map.cleared();
        assert_eq!(map.len(), 10);
        assert_eq!(updated.len(), 11);
        assert_eq!(removed.len(), 9);
        assert!(cleared.is_empty());
        assert!(Arc::ptr_eq(map.context(), cleared.context()));
        assert!(map.removed(&99).ptr_eq(&map));
    }

    #[test]
    fn test_comparator_context() {
        let mut map: BTree<i32, (), (), _> =
            BTree::with_context(ComparatorContext::new(|a: &i32, b: &i32| b.cmp(a)));
        for key in 0..20 {
            map.set(key, ());
        }
        let keys: Vec<i32> = map.keys().collect();
        assert_eq!(keys, (0..20).rev().collect::<Vec<_>>());
        map.validate().unwrap();
    }

    #[test]
    fn test_edit_entries_adopts_cursor_edits() {
        let mut map: BTree<i32, i32> = BTree::with_page_split_size(4).unwrap();
        map.extend((0..20).map(|k| (k, k)));
        let snapshot = map.clone();

        let visited = map.edit_entries(|cursor| {
            let mut visited = 0;
            while let Some((key, value)) = cursor.next() {
                visited += 1;
                if key % 2 == 0 {
                    cursor.delete().unwrap();
                } else {
                    cursor.set((key, value * 100)).unwrap();
                }
            }
            visited
        });

        assert_eq!(visited, 20);
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&3), Some(&300));
        assert_eq!(map.get(&4), None);
        map.check_invariants_detailed().unwrap();
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot.get(&3), Some(&3));
    }

    #[test]
    fn test_edit_entries_without_edits_keeps_root() {
        let mut map: BTree<i32, i32> = (0..50).map(|k| (k, k)).collect();
        let before = map.clone();
        let sum: i32 = map.edit_entries(|cursor| cursor.map(|(_, v)| v).sum());
        assert_eq!(sum, (0..50).sum());
        assert!(map.ptr_eq(&before));
    }

    #[test]
    fn test_debug_and_eq() {
        let a: BTree<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
        let b: BTree<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
        assert_eq!(format!("{:?}", a), r#"{1: "a", 2: "b"}"#);
        assert_eq!(a, b);
        assert_ne!(a, b.removed(&1));
    }

    #[test]
    fn test_eq_across_page_shapes() {
        let mut narrow = BTree::with_page_split_size(4).unwrap();
        let mut wide = BTree::with_page_split_size(9).unwrap();
        for key in 0..300 {
            narrow.set(key, key * 2);
            wide.set(299 - key, (299 - key) * 2);
        }
        assert_ne!(narrow.leaf_sizes(), wide.leaf_sizes());
        assert_eq!(narrow, wide);

        wide.set(150, -1);
        assert_ne!(narrow, wide);
        wide.set(150, 300);
        assert_eq!(narrow, wide);
        wide.delete(&299);
        assert_ne!(narrow, wide);
        narrow.delete(&299);
        assert_eq!(narrow, wide);
    }
}
