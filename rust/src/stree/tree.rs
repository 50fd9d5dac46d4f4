//! The indexed sequence facade.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::types::STreePage;
use crate::context::{PageLimits, STreeContext, SequenceContext};
use crate::cursor::{KeyCursor, PageCursor, ValueCursor};
use crate::error::{check_index, check_insertion_index, IndexResult, InitResult, TreeError};

/// Cursor over the `(id, value)` slots of an [`STree`].
pub type STreeCursor<V, I = u64, U = ()> = PageCursor<STreePage<V, I, U>>;

/// A persistent sequence addressed by position, whose elements carry stable
/// ids.
///
/// Positions shift as elements are inserted and removed; an element's id
/// stays with it. Ids come from the context unless the caller supplies one.
///
/// # Examples
///
/// ```
/// use pagetree::STree;
///
/// let mut seq = STree::new();
/// for value in 1..=5 {
///     seq.insert(0, value, None).unwrap();
/// }
/// let values: Vec<i32> = seq.values().collect();
/// assert_eq!(values, vec![5, 4, 3, 2, 1]);
///
/// let id = *seq.get_id(4).unwrap();
/// seq.insert(0, 0, None).unwrap();
/// assert_eq!(seq.lookup(&id, 0), Some(5));
/// ```
pub struct STree<V, I = u64, U = (), C = SequenceContext> {
    pub(super) root: STreePage<V, I, U>,
    pub(super) context: Arc<C>,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl<V> STree<V> {
    /// Creates an empty sequence with increasing `u64` ids.
    pub fn new() -> Self {
        Self::with_context(SequenceContext::default())
    }

    /// Creates an empty sequence whose pages split above `page_split_size`
    /// elements.
    pub fn with_page_split_size(page_split_size: usize) -> InitResult<Self> {
        Ok(Self::with_context(SequenceContext::new(page_split_size)?))
    }
}

impl<V, I, U, C> STree<V, I, U, C> {
    pub fn with_context(context: C) -> Self {
        Self {
            root: STreePage::empty(),
            context: Arc::new(context),
        }
    }

    /// Wraps an existing root page.
    pub fn from_root(root: STreePage<V, I, U>, context: Arc<C>) -> Self {
        Self { root, context }
    }

    pub fn root(&self) -> &STreePage<V, I, U> {
        &self.root
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.root.size()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
    }

    pub fn fold(&self) -> Option<&U> {
        self.root.fold()
    }

    pub fn get(&self, index: usize) -> IndexResult<&V> {
        self.root
            .get(index)
            .ok_or_else(|| TreeError::index_out_of_bounds(index, self.len()))
    }

    /// `(id, value)` of the element at `index`.
    pub fn get_entry(&self, index: usize) -> IndexResult<(&I, &V)> {
        self.root
            .get_entry(index)
            .ok_or_else(|| TreeError::index_out_of_bounds(index, self.len()))
    }

    pub fn get_id(&self, index: usize) -> IndexResult<&I> {
        self.root
            .get_id(index)
            .ok_or_else(|| TreeError::index_out_of_bounds(index, self.len()))
    }

    pub fn first(&self) -> Option<&V> {
        self.root.first_entry().map(|(_, value)| value)
    }

    pub fn last(&self) -> Option<&V> {
        self.root.last_entry().map(|(_, value)| value)
    }

    pub fn first_entry(&self) -> Option<(&I, &V)> {
        self.root.first_entry()
    }

    pub fn last_entry(&self) -> Option<(&I, &V)> {
        self.root.last_entry()
    }

    /// Position of the element carrying `id`.
    ///
    /// Searches forward from the hint `start`, then the positions before it,
    /// so a good hint makes the lookup proportional to the distance moved.
    pub fn lookup(&self, id: &I, start: usize) -> Option<usize>
    where
        I: PartialEq,
    {
        let len = self.len();
        let start = start.min(len);
        let mut matches = |candidate: &I| candidate == id;
        self.root
            .position_in(start, len, &mut matches)
            .or_else(|| self.root.position_in(0, start, &mut matches))
    }

    /// Visits values in order until `f` returns a value.
    pub fn for_each<R>(&self, mut f: impl FnMut(&V) -> Option<R>) -> Option<R> {
        self.root.for_each(&mut f)
    }

    /// Visits `(id, value)` pairs in order until `f` returns a value.
    pub fn for_each_entry<R>(&self, mut f: impl FnMut(&I, &V) -> Option<R>) -> Option<R> {
        self.root.for_each_entry(&mut f)
    }
}

// ============================================================================
// UPDATES
// ============================================================================

impl<V: Clone, I: Clone, U: Clone, C: STreeContext<V, I>> STree<V, I, U, C> {
    /// Replaces the value at `index`, keeping its id.
    pub fn update(&mut self, index: usize, value: V) -> IndexResult<&mut Self>
    where
        V: PartialEq,
    {
        check_index(index, self.len())?;
        self.root = self.root.updated(index, value);
        Ok(self)
    }

    /// Inserts `value` before position `index`; `index == len()` appends.
    ///
    /// Without an explicit `id` the context assigns one.
    pub fn insert(&mut self, index: usize, value: V, id: Option<I>) -> IndexResult<&mut Self> {
        check_insertion_index(index, self.len())?;
        let ctx = self.context.as_ref();
        let root = self.root.inserted(index, value, id, ctx);
        let balanced = root.balanced(ctx);
        if !balanced.ptr_eq(&root) {
            trace!(len = balanced.size(), depth = balanced.depth(), "root page split");
        }
        self.root = balanced;
        Ok(self)
    }

    /// Removes and returns the value at `index`.
    pub fn remove(&mut self, index: usize) -> IndexResult<V> {
        let value = self.get(index)?.clone();
        let ctx = self.context.as_ref();
        self.root = self.root.removed(index, ctx).balanced(ctx);
        if self.root.is_empty() {
            trace!("sequence collapsed to the empty page");
        }
        Ok(value)
    }

    /// Appends `value`.
    pub fn push(&mut self, value: V) -> &mut Self {
        let ctx = self.context.as_ref();
        self.root = self.root.inserted(self.root.size(), value, None, ctx).balanced(ctx);
        self
    }

    /// Removes the last value.
    pub fn pop(&mut self) -> Option<V> {
        let last = self.len().checked_sub(1)?;
        self.remove(last).ok()
    }

    /// Prepends `value`.
    pub fn unshift(&mut self, value: V) -> &mut Self {
        let ctx = self.context.as_ref();
        self.root = self.root.inserted(0, value, None, ctx).balanced(ctx);
        self
    }

    /// Removes the first value.
    pub fn shift(&mut self) -> Option<V> {
        if self.is_empty() {
            return None;
        }
        self.remove(0).ok()
    }

    /// Moves the element at `from` so that it ends up at position `to`,
    /// keeping its id.
    pub fn move_entry(&mut self, from: usize, to: usize) -> IndexResult<&mut Self> {
        let len = self.len();
        check_index(from, len)?;
        check_index(to, len)?;
        if from == to {
            return Ok(self);
        }
        let (id, value) = self
            .root
            .get_entry(from)
            .map(|(id, value)| (id.clone(), value.clone()))
            .ok_or_else(|| TreeError::index_out_of_bounds(from, len))?;
        let ctx = self.context.as_ref();
        self.root = self
            .root
            .removed(from, ctx)
            .inserted(to, value, Some(id), ctx)
            .balanced(ctx);
        Ok(self)
    }

    /// Removes up to `delete_count` values starting at `start`, inserts
    /// `values` there, and returns the removed values.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetree::STree;
    ///
    /// let mut seq: STree<char> = "abcdef".chars().collect();
    /// let removed = seq.splice(1, 3, "XY".chars()).unwrap();
    /// assert_eq!(removed, vec!['b', 'c', 'd']);
    /// assert_eq!(seq.values().collect::<String>(), "aXYef");
    /// ```
    pub fn splice(&mut self, start: usize, delete_count: usize, values: impl IntoIterator<Item = V>) -> IndexResult<Vec<V>> {
        check_insertion_index(start, self.len())?;
        let count = delete_count.min(self.len() - start);
        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            removed.push(self.remove(start)?);
        }
        for (offset, value) in values.into_iter().enumerate() {
            self.insert(start + offset, value, None)?;
        }
        Ok(removed)
    }

    /// Removes the first `lower` elements.
    pub fn drop(&mut self, lower: usize) -> &mut Self {
        self.root = self.root.drop(lower, self.context.as_ref());
        self
    }

    /// Keeps only the first `upper` elements.
    pub fn take(&mut self, upper: usize) -> &mut Self {
        self.root = self.root.take(upper, self.context.as_ref());
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.root = STreePage::empty();
        self
    }

    /// Sequence with the value at `index` replaced, leaving this one untouched.
    pub fn updated(&self, index: usize, value: V) -> IndexResult<Self>
    where
        V: PartialEq,
    {
        let mut seq = self.clone();
        seq.update(index, value)?;
        Ok(seq)
    }

    /// Sequence with `value` inserted at `index`, leaving this one untouched.
    pub fn inserted(&self, index: usize, value: V, id: Option<I>) -> IndexResult<Self> {
        let mut seq = self.clone();
        seq.insert(index, value, id)?;
        Ok(seq)
    }

    /// Sequence without the element at `index`, leaving this one untouched.
    pub fn removed(&self, index: usize) -> IndexResult<Self> {
        let mut seq = self.clone();
        seq.remove(index)?;
        Ok(seq)
    }

    pub fn cleared(&self) -> Self {
        Self::from_root(STreePage::empty(), self.context.clone())
    }

    /// Folds all values in sequence order, caching the fold on every page.
    /// See [`BTree::reduced`](crate::BTree::reduced).
    pub fn reduced<A, B>(&mut self, identity: U, accumulator: A, combiner: B) -> U
    where
        A: Fn(U, &V) -> U,
        B: Fn(U, &U) -> U,
    {
        self.root = self.root.reduced(&identity, &accumulator, &combiner);
        self.root.fold().cloned().unwrap_or(identity)
    }

    /// Runs `f` over a cursor of this sequence's slots and adopts its edits.
    ///
    /// Cursor edits are copy-on-write and adopted without rebalancing.
    pub fn edit_entries<R>(&mut self, f: impl FnOnce(&mut STreeCursor<V, I, U>) -> R) -> R {
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

impl<V: Clone, I: Clone, U: Clone, C> STree<V, I, U, C> {
    pub fn entries(&self) -> STreeCursor<V, I, U> {
        self.root.entries()
    }

    pub fn reverse_entries(&self) -> STreeCursor<V, I, U> {
        self.root.reverse_entries()
    }

    /// Cursor over the ids in sequence order.
    pub fn keys(&self) -> KeyCursor<STreeCursor<V, I, U>> {
        KeyCursor::new(self.entries())
    }

    pub fn reverse_keys(&self) -> KeyCursor<STreeCursor<V, I, U>> {
        KeyCursor::new(self.reverse_entries())
    }

    pub fn values(&self) -> ValueCursor<STreeCursor<V, I, U>> {
        ValueCursor::new(self.entries())
    }

    pub fn reverse_values(&self) -> ValueCursor<STreeCursor<V, I, U>> {
        ValueCursor::new(self.reverse_entries())
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl<V, I, U, C> Clone for STree<V, I, U, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            context: self.context.clone(),
        }
    }
}

impl<V, I, U, C: Default> Default for STree<V, I, U, C> {
    fn default() -> Self {
        Self::with_context(C::default())
    }
}

impl<V: fmt::Debug, I, U, C> fmt::Debug for STree<V, I, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.for_each(|value| {
            list.entry(value);
            None::<()>
        });
        list.finish()
    }
}

/// Sequences are equal when they hold equal values in the same order; ids are
/// not compared.
impl<V: PartialEq, I, U, C> PartialEq for STree<V, I, U, C> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && {
                let (mine, theirs) = (self.root.leaf_runs(), other.root.leaf_runs());
                let values = mine.iter().flat_map(|run| run.iter().map(|(_, value)| value));
                values.eq(theirs.iter().flat_map(|run| run.iter().map(|(_, value)| value)))
            })
    }
}

impl<V: Clone> FromIterator<V> for STree<V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<V, I, U, C> Extend<V> for STree<V, I, U, C>
where
    V: Clone,
    I: Clone,
    U: Clone,
    C: STreeContext<V, I>,
{
    fn extend<T: IntoIterator<Item = V>>(&mut self, iter: T) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<V, I, U, C: PageLimits> STree<V, I, U, C> {
    /// Page split size of this sequence's context.
    pub fn page_split_size(&self) -> usize {
        self.context.page_split_size()
    }
}
