//! Bidirectional cursors over page trees.
//!
//! A [`PageCursor`] walks a page: a leaf through a [`SlotCursor`] over its
//! slots, a node through a [`NodeCursor`] that lazily opens one sub-cursor per
//! child as traversal reaches it. Both collection families share these types;
//! a page family only has to implement [`CursorPage`].
//!
//! Cursors own reference-counted handles to the pages they walk, so they do
//! not borrow the tree they came from. `set` and `delete` edit the cursor's own
//! copy-on-write view: the pages of the source tree are never touched, and the
//! edited view can be rebuilt into a fresh page with [`PageCursor::into_page`].

use std::fmt;
use std::sync::Arc;

use crate::error::{CursorResult, TreeError};

// ============================================================================
// CURSOR TRAIT
// ============================================================================

/// A bidirectional iterator positioned *between* elements.
///
/// `next` moves forward over one element, `previous` moves backward over one.
/// `set`, `modify` and `delete` apply to the element most recently passed over
/// by `next`, `previous` or `step`.
pub trait Cursor: Iterator {
    /// Returns true when no element follows the cursor.
    fn is_empty(&self) -> bool {
        !self.has_next()
    }

    /// Returns the element `next` would return, without moving.
    fn head(&mut self) -> CursorResult<Self::Item>;

    /// Moves forward over one element without returning it.
    fn step(&mut self) -> CursorResult<()>;

    /// Moves forward over up to `count` elements.
    fn skip_forward(&mut self, count: usize);

    fn has_next(&self) -> bool;

    /// Position of the element `next` would return.
    fn next_index(&self) -> usize;

    fn has_previous(&self) -> bool;

    /// Position of the element `previous` would return.
    fn previous_index(&self) -> Option<usize> {
        self.next_index().checked_sub(1)
    }

    /// Moves backward over one element and returns it.
    fn previous(&mut self) -> Option<Self::Item>;

    /// Edits the element most recently passed over in place.
    fn modify(&mut self, f: &mut dyn FnMut(&mut Self::Item)) -> CursorResult<()>;

    /// Replaces the element most recently passed over.
    fn set(&mut self, item: Self::Item) -> CursorResult<()> {
        let mut item = Some(item);
        self.modify(&mut |slot| {
            if let Some(item) = item.take() {
                *slot = item;
            }
        })
    }

    /// Removes the element most recently passed over.
    fn delete(&mut self) -> CursorResult<()>;
}

fn exhausted(operation: &str) -> TreeError {
    TreeError::illegal_state(operation, "on an exhausted cursor")
}

fn unpositioned(operation: &str) -> TreeError {
    TreeError::illegal_state(operation, "before next or previous")
}

// ============================================================================
// PAGE FAMILY HOOKS
// ============================================================================

/// A page kind that cursors can walk and rebuild.
pub trait CursorPage: Clone + Sized {
    /// What a leaf stores per element.
    type Slot: Clone;

    /// Number of elements under this page.
    fn size(&self) -> usize;

    /// Cursor positioned before the first element.
    fn cursor(&self) -> PageCursor<Self>;

    /// Cursor positioned after the last element.
    fn reverse_cursor(&self) -> PageCursor<Self>;

    /// Rebuilds a leaf from slots edited through a cursor.
    fn rebuild_leaf(slots: Arc<Vec<Self::Slot>>) -> Self;

    /// Rebuilds a node from children edited through a cursor.
    fn rebuild_node(pages: Vec<Self>) -> Self;
}

// ============================================================================
// SLOT CURSOR
// ============================================================================

/// Cursor over the slots of a single leaf.
#[derive(Clone)]
pub struct SlotCursor<S> {
    slots: Arc<Vec<S>>,
    index: usize,
    last: Option<usize>,
    edited: bool,
}

impl<S> SlotCursor<S> {
    pub fn new(slots: Arc<Vec<S>>) -> Self {
        Self {
            slots,
            index: 0,
            last: None,
            edited: false,
        }
    }

    pub fn at_end(slots: Arc<Vec<S>>) -> Self {
        let index = slots.len();
        Self {
            slots,
            index,
            last: None,
            edited: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Arc::new(Vec::new()))
    }

    /// Returns true once `set`, `modify` or `delete` succeeded.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// The (possibly edited) slots.
    pub fn into_slots(self) -> Arc<Vec<S>> {
        self.slots
    }
}

impl<S> fmt::Debug for SlotCursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotCursor")
            .field("index", &self.index)
            .field("len", &self.slots.len())
            .finish()
    }
}

impl<S: Clone> Iterator for SlotCursor<S> {
    type Item = S;

    fn next(&mut self) -> Option<S> {
        let slot = self.slots.get(self.index)?.clone();
        self.last = Some(self.index);
        self.index += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.slots.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<S: Clone> Cursor for SlotCursor<S> {
    fn head(&mut self) -> CursorResult<S> {
        self.slots
            .get(self.index)
            .cloned()
            .ok_or_else(|| exhausted("read the head"))
    }

    fn step(&mut self) -> CursorResult<()> {
        if self.index >= self.slots.len() {
            return Err(exhausted("step"));
        }
        self.last = Some(self.index);
        self.index += 1;
        Ok(())
    }

    fn skip_forward(&mut self, count: usize) {
        self.index = self.index.saturating_add(count).min(self.slots.len());
        self.last = None;
    }

    fn has_next(&self) -> bool {
        self.index < self.slots.len()
    }

    fn next_index(&self) -> usize {
        self.index
    }

    fn has_previous(&self) -> bool {
        self.index > 0
    }

    fn previous(&mut self) -> Option<S> {
        let index = self.index.checked_sub(1)?;
        self.index = index;
        self.last = Some(index);
        Some(self.slots[index].clone())
    }

    fn modify(&mut self, f: &mut dyn FnMut(&mut S)) -> CursorResult<()> {
        let index = self.last.ok_or_else(|| unpositioned("set"))?;
        f(&mut Arc::make_mut(&mut self.slots)[index]);
        self.edited = true;
        Ok(())
    }

    fn delete(&mut self) -> CursorResult<()> {
        let index = self.last.take().ok_or_else(|| unpositioned("delete"))?;
        Arc::make_mut(&mut self.slots).remove(index);
        if index < self.index {
            self.index -= 1;
        }
        self.edited = true;
        Ok(())
    }
}

// ============================================================================
// NODE CURSOR
// ============================================================================

/// Cursor over the children of a node.
///
/// Holds the child pages, the logical position, the index of the active child
/// and a lazily created sub-cursor over that child. Without a sub-cursor the
/// position is the start of child `page_index`. An edited sub-cursor is folded
/// back into `pages` when traversal leaves its child.
pub struct NodeCursor<P: CursorPage> {
    pages: Vec<P>,
    size: usize,
    index: usize,
    page_index: usize,
    page_cursor: Option<Box<PageCursor<P>>>,
    edited: bool,
}

impl<P: CursorPage> NodeCursor<P> {
    pub fn new(pages: Vec<P>, size: usize) -> Self {
        Self {
            pages,
            size,
            index: 0,
            page_index: 0,
            page_cursor: None,
            edited: false,
        }
    }

    pub fn at_end(pages: Vec<P>, size: usize) -> Self {
        let page_index = pages.len();
        Self {
            pages,
            size,
            index: size,
            page_index,
            page_cursor: None,
            edited: false,
        }
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Rebuilds the node from its (possibly edited) children.
    pub fn into_page(mut self) -> P {
        self.release_page_cursor();
        P::rebuild_node(self.pages)
    }

    fn release_page_cursor(&mut self) {
        if let Some(cursor) = self.page_cursor.take() {
            if cursor.is_edited() {
                self.pages[self.page_index] = (*cursor).into_page();
            }
        }
    }

    /// Leaves the active sub-cursor on a child with a next element.
    fn seek_next(&mut self) -> bool {
        loop {
            match self.page_cursor.as_ref().map(|cursor| cursor.has_next()) {
                Some(true) => return true,
                Some(false) => {
                    self.release_page_cursor();
                    self.page_index += 1;
                }
                None if self.page_index < self.pages.len() => {
                    let cursor = self.pages[self.page_index].cursor();
                    self.page_cursor = Some(Box::new(cursor));
                }
                None => return false,
            }
        }
    }

    /// Leaves the active sub-cursor on a child with a previous element.
    fn seek_previous(&mut self) -> bool {
        loop {
            match self.page_cursor.as_ref().map(|cursor| cursor.has_previous()) {
                Some(true) => return true,
                Some(false) => self.release_page_cursor(),
                None if self.page_index > 0 => {
                    self.page_index -= 1;
                    let cursor = self.pages[self.page_index].reverse_cursor();
                    self.page_cursor = Some(Box::new(cursor));
                }
                None => return false,
            }
        }
    }
}

impl<P: CursorPage> fmt::Debug for NodeCursor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCursor")
            .field("index", &self.index)
            .field("size", &self.size)
            .field("page_index", &self.page_index)
            .finish()
    }
}

impl<P: CursorPage> Iterator for NodeCursor<P> {
    type Item = P::Slot;

    fn next(&mut self) -> Option<P::Slot> {
        if !self.seek_next() {
            return None;
        }
        let item = self.page_cursor.as_mut().and_then(|cursor| cursor.next());
        if item.is_some() {
            self.index += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.index;
        (remaining, Some(remaining))
    }
}

impl<P: CursorPage> Cursor for NodeCursor<P> {
    fn head(&mut self) -> CursorResult<P::Slot> {
        if !self.seek_next() {
            return Err(exhausted("read the head"));
        }
        match self.page_cursor.as_mut() {
            Some(cursor) => cursor.head(),
            None => Err(exhausted("read the head")),
        }
    }

    fn step(&mut self) -> CursorResult<()> {
        if !self.seek_next() {
            return Err(exhausted("step"));
        }
        match self.page_cursor.as_mut() {
            Some(cursor) => cursor.step()?,
            None => return Err(exhausted("step")),
        }
        self.index += 1;
        Ok(())
    }

    fn skip_forward(&mut self, mut count: usize) {
        while count > 0 {
            if let Some(cursor) = self.page_cursor.as_mut() {
                let before = cursor.next_index();
                cursor.skip_forward(count);
                let skipped = cursor.next_index() - before;
                self.index += skipped;
                count -= skipped;
                if count > 0 {
                    self.release_page_cursor();
                    self.page_index += 1;
                }
            } else if self.page_index < self.pages.len() {
                // Unvisited children are skipped whole by size.
                let size = self.pages[self.page_index].size();
                if size <= count {
                    self.index += size;
                    count -= size;
                    self.page_index += 1;
                } else {
                    let cursor = self.pages[self.page_index].cursor();
                    self.page_cursor = Some(Box::new(cursor));
                }
            } else {
                break;
            }
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.size
    }

    fn next_index(&self) -> usize {
        self.index
    }

    fn has_previous(&self) -> bool {
        self.index > 0
    }

    fn previous(&mut self) -> Option<P::Slot> {
        if !self.seek_previous() {
            return None;
        }
        let item = self.page_cursor.as_mut().and_then(|cursor| cursor.previous());
        if item.is_some() {
            self.index -= 1;
        }
        item
    }

    fn modify(&mut self, f: &mut dyn FnMut(&mut P::Slot)) -> CursorResult<()> {
        match self.page_cursor.as_mut() {
            Some(cursor) => cursor.modify(f)?,
            None => return Err(unpositioned("set")),
        }
        self.edited = true;
        Ok(())
    }

    fn delete(&mut self) -> CursorResult<()> {
        let cursor = self
            .page_cursor
            .as_mut()
            .ok_or_else(|| unpositioned("delete"))?;
        let before = cursor.next_index();
        cursor.delete()?;
        let after = cursor.next_index();
        self.index -= before - after;
        self.size -= 1;
        self.edited = true;
        Ok(())
    }
}

// ============================================================================
// PAGE CURSOR
// ============================================================================

/// Cursor over any page: a leaf's slots or a node's children.
pub enum PageCursor<P: CursorPage> {
    Leaf(SlotCursor<P::Slot>),
    Node(NodeCursor<P>),
}

impl<P: CursorPage> PageCursor<P> {
    pub fn empty() -> Self {
        PageCursor::Leaf(SlotCursor::empty())
    }

    /// Returns true once an element was edited or deleted through this cursor.
    pub fn is_edited(&self) -> bool {
        match self {
            PageCursor::Leaf(cursor) => cursor.is_edited(),
            PageCursor::Node(cursor) => cursor.is_edited(),
        }
    }

    /// Rebuilds a page from the cursor's view, including every edit.
    pub fn into_page(self) -> P {
        match self {
            PageCursor::Leaf(cursor) => P::rebuild_leaf(cursor.into_slots()),
            PageCursor::Node(cursor) => cursor.into_page(),
        }
    }
}

impl<P: CursorPage> fmt::Debug for PageCursor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCursor::Leaf(cursor) => cursor.fmt(f),
            PageCursor::Node(cursor) => cursor.fmt(f),
        }
    }
}

impl<P: CursorPage> Iterator for PageCursor<P> {
    type Item = P::Slot;

    fn next(&mut self) -> Option<P::Slot> {
        match self {
            PageCursor::Leaf(cursor) => cursor.next(),
            PageCursor::Node(cursor) => cursor.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            PageCursor::Leaf(cursor) => cursor.size_hint(),
            PageCursor::Node(cursor) => cursor.size_hint(),
        }
    }
}

impl<P: CursorPage> Cursor for PageCursor<P> {
    fn head(&mut self) -> CursorResult<P::Slot> {
        match self {
            PageCursor::Leaf(cursor) => cursor.head(),
            PageCursor::Node(cursor) => cursor.head(),
        }
    }

    fn step(&mut self) -> CursorResult<()> {
        match self {
            PageCursor::Leaf(cursor) => cursor.step(),
            PageCursor::Node(cursor) => cursor.step(),
        }
    }

    fn skip_forward(&mut self, count: usize) {
        match self {
            PageCursor::Leaf(cursor) => cursor.skip_forward(count),
            PageCursor::Node(cursor) => cursor.skip_forward(count),
        }
    }

    fn has_next(&self) -> bool {
        match self {
            PageCursor::Leaf(cursor) => cursor.has_next(),
            PageCursor::Node(cursor) => cursor.has_next(),
        }
    }

    fn next_index(&self) -> usize {
        match self {
            PageCursor::Leaf(cursor) => cursor.next_index(),
            PageCursor::Node(cursor) => cursor.next_index(),
        }
    }

    fn has_previous(&self) -> bool {
        match self {
            PageCursor::Leaf(cursor) => cursor.has_previous(),
            PageCursor::Node(cursor) => cursor.has_previous(),
        }
    }

    fn previous(&mut self) -> Option<P::Slot> {
        match self {
            PageCursor::Leaf(cursor) => cursor.previous(),
            PageCursor::Node(cursor) => cursor.previous(),
        }
    }

    fn modify(&mut self, f: &mut dyn FnMut(&mut P::Slot)) -> CursorResult<()> {
        match self {
            PageCursor::Leaf(cursor) => cursor.modify(f),
            PageCursor::Node(cursor) => cursor.modify(f),
        }
    }

    fn delete(&mut self) -> CursorResult<()> {
        match self {
            PageCursor::Leaf(cursor) => cursor.delete(),
            PageCursor::Node(cursor) => cursor.delete(),
        }
    }
}

// ============================================================================
// ENTRY PROJECTIONS
// ============================================================================

/// Projects an entry cursor onto the first component of each entry.
#[derive(Debug)]
pub struct KeyCursor<C> {
    inner: C,
}

/// Projects an entry cursor onto the second component of each entry.
#[derive(Debug)]
pub struct ValueCursor<C> {
    inner: C,
}

impl<C> KeyCursor<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> ValueCursor<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<A, B, C: Iterator<Item = (A, B)>> Iterator for KeyCursor<C> {
    type Item = A;

    fn next(&mut self) -> Option<A> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, B, C: Iterator<Item = (A, B)>> Iterator for ValueCursor<C> {
    type Item = B;

    fn next(&mut self) -> Option<B> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, B, C: Cursor<Item = (A, B)>> Cursor for KeyCursor<C> {
    fn head(&mut self) -> CursorResult<A> {
        self.inner.head().map(|(key, _)| key)
    }

    fn step(&mut self) -> CursorResult<()> {
        self.inner.step()
    }

    fn skip_forward(&mut self, count: usize) {
        self.inner.skip_forward(count)
    }

    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next_index(&self) -> usize {
        self.inner.next_index()
    }

    fn has_previous(&self) -> bool {
        self.inner.has_previous()
    }

    fn previous(&mut self) -> Option<A> {
        self.inner.previous().map(|(key, _)| key)
    }

    fn modify(&mut self, f: &mut dyn FnMut(&mut A)) -> CursorResult<()> {
        self.inner.modify(&mut |entry: &mut (A, B)| f(&mut entry.0))
    }

    fn delete(&mut self) -> CursorResult<()> {
        self.inner.delete()
    }
}

impl<A, B, C: Cursor<Item = (A, B)>> Cursor for ValueCursor<C> {
    fn head(&mut self) -> CursorResult<B> {
        self.inner.head().map(|(_, value)| value)
    }

    fn step(&mut self) -> CursorResult<()> {
        self.inner.step()
    }

    fn skip_forward(&mut self, count: usize) {
        self.inner.skip_forward(count)
    }

    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next_index(&self) -> usize {
        self.inner.next_index()
    }

    fn has_previous(&self) -> bool {
        self.inner.has_previous()
    }

    fn previous(&mut self) -> Option<B> {
        self.inner.previous().map(|(_, value)| value)
    }

    fn modify(&mut self, f: &mut dyn FnMut(&mut B)) -> CursorResult<()> {
        self.inner.modify(&mut |entry: &mut (A, B)| f(&mut entry.1))
    }

    fn delete(&mut self) -> CursorResult<()> {
        self.inner.delete()
    }
}
