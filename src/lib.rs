//! # balanced-forest
//!
//! Self-balancing binary search trees for Rust.
//!
//! ## Overview
//!
//! This library provides two independent ordered maps that keep their
//! shape balanced under arbitrary insertion and deletion:
//!
//! - **AVL Tree**: [`AvlTreeMap`](tree::AvlTreeMap), height-balanced via
//!   single and double rotations
//! - **Left-Leaning Red-Black Tree**:
//!   [`RedBlackTreeMap`](tree::RedBlackTreeMap), balanced via rotations and
//!   color flips, with `rank`/`select`/`floor`/`ceiling` order statistics
//! - **Traversal**: pre-order, in-order, post-order and level-order walks
//!   (and their reverses) over either tree
//! - **Diagnostics**: a `verify` pass on each tree that reports every
//!   broken invariant as a structured [`InvariantError`](error::InvariantError)
//!
//! ## Feature Flags
//!
//! - `avl`: the AVL tree map (default)
//! - `red-black`: the left-leaning red-black tree map (default)
//! - `serde`: `Serialize`/`Deserialize` for both maps
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use balanced_forest::prelude::*;
//!
//! let mut map = RedBlackTreeMap::new();
//! for key in [6, 8, 7, 4, 5, 9, 3] {
//!     map.insert(key, key * 10);
//! }
//!
//! assert_eq!(map.rank(&7), 4);
//! assert_eq!(map.select(0), Some((&3, &30)));
//! assert!(map.verify().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the tree maps, the traversal vocabulary and the error types.
///
/// # Usage
///
/// ```rust
/// use balanced_forest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::*;
    pub use crate::tree::*;
}

pub mod error;
pub mod tree;
