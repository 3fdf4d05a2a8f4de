//! Self-balancing binary search trees.
//!
//! This module provides two ordered maps sharing the same contract
//! (`Ord` keys, unique keys, overwrite on re-insert) but balanced by
//! different disciplines:
//!
//! - [`AvlTreeMap`]: keeps `|height(left) - height(right)| <= 1` at every
//!   node via single and double rotations
//! - [`RedBlackTreeMap`]: a left-leaning red-black tree; red links lean
//!   left, never occur twice in a row, and every root-to-leaf path crosses
//!   the same number of black links. Subtree counts give O(log N)
//!   `rank`/`select`.
//!
//! Both expose their nodes read-only through the [`BinaryTree`] and
//! [`BinaryNode`] traits, which is all [`traverse`] needs.
//!
//! # Ownership
//!
//! Every child is exclusively owned by its parent (`Option<Box<_>>`), and
//! every rebalancing helper takes an owned subtree and returns the new
//! subtree root. There are no parent pointers.
//!
//! # Examples
//!
//! ## `AvlTreeMap`
//!
//! ```rust
//! use balanced_forest::tree::AvlTreeMap;
//!
//! let mut map: AvlTreeMap<i32, &str> = [(2, "two"), (1, "one"), (3, "three")]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(map.insert(2, "TWO"), Some("two"));
//! assert_eq!(map.remove(&1), Some("one"));
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&2, &3]);
//! ```
//!
//! ## `RedBlackTreeMap`
//!
//! ```rust
//! use balanced_forest::tree::RedBlackTreeMap;
//!
//! let map: RedBlackTreeMap<i32, i32> = (0..10).map(|key| (key * 10, key)).collect();
//!
//! assert_eq!(map.floor(&35), Some(&30));
//! assert_eq!(map.ceiling(&35), Some(&40));
//! assert_eq!(map.rank(&50), 5);
//! assert_eq!(map.range_len(&20, &60), 5);
//! ```
//!
//! ## Traversal
//!
//! ```rust
//! use balanced_forest::tree::{AvlTreeMap, TraversalOrder};
//!
//! let map: AvlTreeMap<i32, ()> = [(2, ()), (1, ()), (3, ())].into_iter().collect();
//!
//! let pre_order: Vec<&i32> = map
//!     .traverse(TraversalOrder::PreOrder)
//!     .map(|(key, _)| key)
//!     .collect();
//! assert_eq!(pre_order, vec![&2, &1, &3]);
//! ```

#[cfg(feature = "avl")]
mod avl;
#[cfg(feature = "red-black")]
mod red_black;
mod render;
mod traversal;

#[cfg(feature = "avl")]
pub use avl::{AvlNode, AvlTreeMap, AvlTreeMapIntoIterator};
#[cfg(feature = "red-black")]
pub use red_black::{
    Color, RedBlackNode, RedBlackTreeMap, RedBlackTreeMapIntoIterator, RedBlackTreeMapRangeIterator,
};
pub use traversal::{BinaryNode, BinaryTree, Traversal, TraversalOrder, traverse};
