//! Error handling and result types for page tree operations.
//!
//! Most collection operations are total: lookups return `Option`, and
//! structural updates signal "nothing changed" by handing back the very same
//! page. Errors are reserved for positional access past the end of an
//! [`STree`](crate::STree), invalid context configuration, cursor misuse, and
//! failed invariant checks.

use thiserror::Error;

/// Error type for page tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A positional operation addressed an index outside the sequence.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// Invalid page split size specified for a context.
    #[error("invalid page split size: {0}")]
    InvalidPageSplitSize(String),
    /// A cursor was asked to do something its current position does not allow.
    #[error("illegal cursor state: {0}")]
    IllegalState(String),
    /// Internal data structure integrity violation.
    #[error("data integrity error: {0}")]
    DataIntegrityError(String),
}

impl TreeError {
    /// Create an IndexOutOfBounds error
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an InvalidPageSplitSize error with context
    pub fn invalid_page_split_size(page_split_size: usize, min_required: usize) -> Self {
        Self::InvalidPageSplitSize(format!(
            "page split size {} is invalid (minimum required: {})",
            page_split_size, min_required
        ))
    }

    /// Create an IllegalState error naming the rejected cursor operation
    pub fn illegal_state(operation: &str, state: &str) -> Self {
        Self::IllegalState(format!("cannot {} {}", operation, state))
    }

    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// Check if this error is an out-of-bounds error
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// Check if this error is a cursor state error
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }
}

/// Public result type for tree operations that may fail
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type for positional (index-addressed) operations
pub type IndexResult<T> = Result<T, TreeError>;

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, TreeError>;

/// Result type for context construction and validation
pub type InitResult<T> = Result<T, TreeError>;

/// Checks that `index` addresses an existing element of a sequence of `len` elements.
pub(crate) fn check_index(index: usize, len: usize) -> IndexResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(TreeError::index_out_of_bounds(index, len))
    }
}

/// Checks that `index` is a valid insertion point, which includes `len` itself.
pub(crate) fn check_insertion_index(index: usize, len: usize) -> IndexResult<()> {
    if index <= len {
        Ok(())
    } else {
        Err(TreeError::index_out_of_bounds(index, len))
    }
}
