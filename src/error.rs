//! Errors reported by fallible map operations.

use crate::alloc::AllocError;
use thiserror::Error;

/// An error from a fallible map operation.
///
/// Looking up or erasing an absent key and inserting a duplicate key are not errors; those report
/// their outcome through their return values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// A node could not be allocated. The map is left unchanged.
    #[error("failed to allocate a tree node")]
    Alloc(#[from] AllocError),

    /// Checked access asked for a key that is not in the map.
    #[error("key not found in map")]
    OutOfRange,
}

/// The result type of fallible map operations.
pub type Result<T> = ::std::result::Result<T, Error>;
