//! An ordered map based on an unbalanced binary search tree.
//!
//! Every node records its parent as well as its children, so a [`Cursor`](map/struct.Cursor.html)
//! can walk to the next or previous entry without a stack. Nodes are allocated one at a time
//! through a pluggable [`NodeAllocator`](alloc/trait.NodeAllocator.html), and the map's ordering is
//! any [`compare::Compare`](https://docs.rs/compare) implementation.
//!
//! # Examples
//!
//! ```
//! use tree_map::Map;
//!
//! let mut map = Map::new();
//!
//! map.insert(5, "five");
//! map.insert(3, "three");
//! map.insert(8, "eight");
//!
//! assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [3, 5, 8]);
//! assert_eq!(map.lower_bound(&4).key(), Some(&5));
//! assert!(map.at(&4).is_err());
//! ```

pub mod alloc;
pub mod error;
pub mod map;
mod node;

#[cfg(feature = "ordered_iter")]
mod ordered_iter;

#[cfg(feature = "quickcheck")]
mod quickcheck;

pub use self::alloc::{AllocError, Global, NodeAllocator};
pub use self::error::{Error, Result};
pub use self::map::Map;
