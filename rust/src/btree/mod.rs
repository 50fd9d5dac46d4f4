//! Persistent ordered map built from copy-on-write pages.

mod delete_operations;
mod fold_operations;
mod get_operations;
mod insert_operations;
mod iteration;
mod slice_operations;
mod tree;
mod types;
mod validation;

pub use tree::{BTree, BTreeCursor};
pub use types::BTreePage;
