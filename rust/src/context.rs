//! Strategy objects threaded through every page operation.
//!
//! A context decides how keys compare (for [`BTree`](crate::BTree)) or how new
//! elements are identified (for [`STree`](crate::STree)), and when a page has
//! grown large enough to split or shrunk small enough to be merged into its
//! parent. Pages never store their context; every structural operation takes
//! it as a parameter.

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::error::{InitResult, TreeError};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Page split size used by the provided contexts unless configured otherwise.
pub const DEFAULT_PAGE_SPLIT_SIZE: usize = 32;

/// Smallest page split size a provided context accepts.
pub const MIN_PAGE_SPLIT_SIZE: usize = 4;

/// Validates a page split size the way every provided context does.
pub fn validate_page_split_size(page_split_size: usize) -> InitResult<usize> {
    if page_split_size < MIN_PAGE_SPLIT_SIZE {
        return Err(TreeError::invalid_page_split_size(
            page_split_size,
            MIN_PAGE_SPLIT_SIZE,
        ));
    }
    Ok(page_split_size)
}

// ============================================================================
// TRAITS
// ============================================================================

/// Anything with a number of slots (leaf) or children (node).
pub trait PageArity {
    /// Number of slots of a leaf, or children of a node.
    fn arity(&self) -> usize;
}

/// Split and merge thresholds shared by both collection families.
pub trait PageLimits {
    /// Arity above which a page splits.
    fn page_split_size(&self) -> usize {
        DEFAULT_PAGE_SPLIT_SIZE
    }

    /// Returns true when `page` has outgrown the split threshold.
    fn page_should_split<P: PageArity + ?Sized>(&self, page: &P) -> bool {
        page.arity() > self.page_split_size()
    }

    /// Returns true when a node `page` is small enough to be inlined into its parent.
    fn page_should_merge<P: PageArity + ?Sized>(&self, page: &P) -> bool {
        page.arity() < self.page_split_size() / 2
    }
}

/// Context of an ordered map: a total order over keys plus page limits.
///
/// A comparator that is not a strict total order produces unspecified (but
/// memory-safe) results.
pub trait BTreeContext<K>: PageLimits {
    fn compare(&self, x: &K, y: &K) -> Ordering;
}

/// Context of an indexed sequence: an id generator plus page limits.
pub trait STreeContext<V, I>: PageLimits {
    /// Assigns an id to a value inserted without an explicit one.
    fn identify(&self, value: &V) -> I;
}

// ============================================================================
// PROVIDED CONTEXTS
// ============================================================================

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdContext {
    page_split_size: usize,
}

impl OrdContext {
    /// Creates a context splitting pages above `page_split_size` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetree::OrdContext;
    ///
    /// assert!(OrdContext::new(16).is_ok());
    /// assert!(OrdContext::new(2).is_err());
    /// ```
    pub fn new(page_split_size: usize) -> InitResult<Self> {
        Ok(Self {
            page_split_size: validate_page_split_size(page_split_size)?,
        })
    }
}

impl Default for OrdContext {
    fn default() -> Self {
        Self {
            page_split_size: DEFAULT_PAGE_SPLIT_SIZE,
        }
    }
}

impl PageLimits for OrdContext {
    fn page_split_size(&self) -> usize {
        self.page_split_size
    }
}

impl<K: Ord> BTreeContext<K> for OrdContext {
    fn compare(&self, x: &K, y: &K) -> Ordering {
        x.cmp(y)
    }
}

/// Orders keys with a caller-supplied comparison function.
#[derive(Clone)]
pub struct ComparatorContext<F> {
    compare: F,
    page_split_size: usize,
}

impl<F> ComparatorContext<F> {
    /// Wraps `compare` with the default page split size.
    pub fn new(compare: F) -> Self {
        Self {
            compare,
            page_split_size: DEFAULT_PAGE_SPLIT_SIZE,
        }
    }

    /// Wraps `compare` with an explicit page split size.
    pub fn with_page_split_size(compare: F, page_split_size: usize) -> InitResult<Self> {
        Ok(Self {
            compare,
            page_split_size: validate_page_split_size(page_split_size)?,
        })
    }
}

impl<F> fmt::Debug for ComparatorContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorContext")
            .field("page_split_size", &self.page_split_size)
            .finish_non_exhaustive()
    }
}

impl<F> PageLimits for ComparatorContext<F> {
    fn page_split_size(&self) -> usize {
        self.page_split_size
    }
}

impl<K, F> BTreeContext<K> for ComparatorContext<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, x: &K, y: &K) -> Ordering {
        (self.compare)(x, y)
    }
}

/// Identifies sequence elements with increasing `u64` ids.
///
/// The counter lives in the context, so every tree derived from the same
/// facade (which share their context) keeps drawing unique ids.
#[derive(Debug)]
pub struct SequenceContext {
    page_split_size: usize,
    next_id: AtomicU64,
}

impl SequenceContext {
    /// Creates a context splitting pages above `page_split_size` elements.
    pub fn new(page_split_size: usize) -> InitResult<Self> {
        Ok(Self {
            page_split_size: validate_page_split_size(page_split_size)?,
            next_id: AtomicU64::new(0),
        })
    }

    /// Id the next anonymous insertion will receive.
    pub fn peek_next_id(&self) -> u64 {
        self.next_id.load(AtomicOrdering::Relaxed)
    }
}

impl Default for SequenceContext {
    fn default() -> Self {
        Self {
            page_split_size: DEFAULT_PAGE_SPLIT_SIZE,
            next_id: AtomicU64::new(0),
        }
    }
}

impl PageLimits for SequenceContext {
    fn page_split_size(&self) -> usize {
        self.page_split_size
    }
}

impl<V> STreeContext<V, u64> for SequenceContext {
    fn identify(&self, _value: &V) -> u64 {
        self.next_id.fetch_add(1, AtomicOrdering::Relaxed)
    }
}

/// Identifies sequence elements with a caller-supplied function of the value.
#[derive(Clone)]
pub struct IdentifyContext<F> {
    identify: F,
    page_split_size: usize,
}

impl<F> IdentifyContext<F> {
    /// Wraps `identify` with the default page split size.
    pub fn new(identify: F) -> Self {
        Self {
            identify,
            page_split_size: DEFAULT_PAGE_SPLIT_SIZE,
        }
    }

    /// Wraps `identify` with an explicit page split size.
    pub fn with_page_split_size(identify: F, page_split_size: usize) -> InitResult<Self> {
        Ok(Self {
            identify,
            page_split_size: validate_page_split_size(page_split_size)?,
        })
    }
}

impl<F> fmt::Debug for IdentifyContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifyContext")
            .field("page_split_size", &self.page_split_size)
            .finish_non_exhaustive()
    }
}

impl<F> PageLimits for IdentifyContext<F> {
    fn page_split_size(&self) -> usize {
        self.page_split_size
    }
}

impl<V, I, F> STreeContext<V, I> for IdentifyContext<F>
where
    F: Fn(&V) -> I,
{
    fn identify(&self, value: &V) -> I {
        (self.identify)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Arity(usize);

    impl PageArity for Arity {
        fn arity(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_page_split_size_validation() {
        assert!(OrdContext::new(MIN_PAGE_SPLIT_SIZE).is_ok());
        let err = OrdContext::new(MIN_PAGE_SPLIT_SIZE - 1).unwrap_err();
        assert!(matches!(err, TreeError::InvalidPageSplitSize(_)));
        assert!(SequenceContext::new(0).is_err());
    }

    #[test]
    fn test_default_thresholds() {
        let ctx = OrdContext::new(8).unwrap();
        assert!(!ctx.page_should_split(&Arity(8)));
        assert!(ctx.page_should_split(&Arity(9)));
        assert!(ctx.page_should_merge(&Arity(3)));
        assert!(!ctx.page_should_merge(&Arity(4)));
        assert_eq!(OrdContext::default().page_split_size(), DEFAULT_PAGE_SPLIT_SIZE);
    }

    #[test]
    fn test_comparator_context() {
        let ctx = ComparatorContext::new(|x: &i32, y: &i32| y.cmp(x));
        assert_eq!(ctx.compare(&1, &2), Ordering::Greater);
        assert_eq!(BTreeContext::<i32>::compare(&OrdContext::default(), &1, &2), Ordering::Less);
    }

    #[test]
    fn test_sequence_ids_are_unique_and_increasing() {
        let ctx = SequenceContext::default();
        let a = STreeContext::<&str, u64>::identify(&ctx, &"a");
        let b = STreeContext::<&str, u64>::identify(&ctx, &"b");
        assert!(a < b);
        assert_eq!(ctx.peek_next_id(), b + 1);
    }

    #[test]
    fn test_identify_context() {
        let ctx = IdentifyContext::new(|value: &String| value.len());
        assert_eq!(ctx.identify(&"four".to_string()), 4);
    }
}
