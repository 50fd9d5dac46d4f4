//! Persistent, structurally shared B-tree collections.
//!
//! This crate provides two collections built from the same copy-on-write page
//! machinery:
//!
//! - [`BTree`], an ordered key→value map;
//! - [`STree`], a sequence addressed by position whose elements carry stable ids.
//!
//! Pages are immutable once built. Every update rebuilds the path it touches
//! and shares the rest, so a clone of a collection is an O(1) snapshot that any
//! number of threads may read while another thread keeps updating its own
//! copy. Updates that change nothing hand back the very same root, which makes
//! [`BTree::ptr_eq`] a cheap no-op detector.
//!
//! Both collections cache caller-defined folds on their pages
//! ([`BTree::reduced`]) and walk their contents with bidirectional
//! [cursors](Cursor).
//!
//! # Examples
//!
//! ```
//! use pagetree::{BTree, STree};
//!
//! let mut map = BTree::with_page_split_size(4).unwrap();
//! for key in [5, 3, 8, 1, 4, 7, 2, 6] {
//!     map.set(key, key * 10);
//! }
//! let keys: Vec<i32> = map.keys().collect();
//! assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7, 8]);
//!
//! let mut seq: STree<i32> = (0..10).collect();
//! seq.drop(3).take(2);
//! assert_eq!(seq.values().collect::<Vec<_>>(), vec![3, 4]);
//! ```

#[macro_use]
mod macros;

mod btree;
mod context;
mod cursor;
mod error;
mod search;
mod stree;

pub use btree::{BTree, BTreeCursor, BTreePage};
pub use context::{
    validate_page_split_size, BTreeContext, ComparatorContext, IdentifyContext, OrdContext,
    PageArity, PageLimits, STreeContext, SequenceContext, DEFAULT_PAGE_SPLIT_SIZE,
    MIN_PAGE_SPLIT_SIZE,
};
pub use cursor::{Cursor, CursorPage, KeyCursor, NodeCursor, PageCursor, SlotCursor, ValueCursor};
pub use error::{CursorResult, IndexResult, InitResult, TreeError, TreeResult};
pub use stree::{STree, STreeCursor, STreePage};
