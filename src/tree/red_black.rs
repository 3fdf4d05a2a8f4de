//! Left-leaning red-black tree map with order statistics.
//!
//! This module provides [`RedBlackTreeMap`], an ordered map backed by a
//! left-leaning red-black (LLRB) tree.
//!
//! # Overview
//!
//! An LLRB tree is a binary encoding of a 2-3 tree: a red link glues a
//! node to its parent into a 3-node. Every node also caches the number of
//! nodes in its subtree, which makes rank and select logarithmic.
//!
//! - O(log N) get
//! - O(log N) insert
//! - O(log N) remove
//! - O(log N) min/max, floor/ceiling
//! - O(log N) rank/select
//! - O(log N + k) range queries where k is the number of results
//! - O(1) len and `is_empty`
//!
//! # Internal Structure
//!
//! The tree maintains the following invariants:
//! 1. Red links lean left: no node has a red right child
//! 2. No node has two red links in a row
//! 3. Every root-to-leaf path crosses the same number of black links
//! 4. The root is black
//! 5. `count(node) == 1 + count(left) + count(right)`
//!
//! These invariants ensure the tree height is at most 2 log2(N + 1).
//!
//! # Examples
//!
//! ```rust
//! use balanced_forest::tree::RedBlackTreeMap;
//!
//! let mut map = RedBlackTreeMap::new();
//! for (key, name) in [(3, "c"), (1, "a"), (2, "b"), (5, "e")] {
//!     map.insert(key, name);
//! }
//!
//! assert_eq!(map.select(2), Some((&3, &"c")));
//! assert_eq!(map.rank(&4), 3);
//! assert_eq!(map.floor(&4), Some(&3));
//!
//! let middle: Vec<&i32> = map.range(2..=3).map(|(key, _)| key).collect();
//! assert_eq!(middle, vec![&2, &3]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::mem;
use std::ops::{Bound, RangeBounds};

use static_assertions::assert_impl_all;

use super::render::render_tree;
use super::traversal::{BinaryNode, BinaryTree, Traversal, TraversalOrder, traverse};
use crate::error::{InvariantError, Violation};

type Link<K, V> = Option<Box<RedBlackNode<K, V>>>;

// =============================================================================
// Color Definition
// =============================================================================

/// The color of the link from a node to its parent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    /// The node is glued to its parent into a 3-node.
    Red,
    /// An ordinary link.
    Black,
}

impl Color {
    const fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// A node of a [`RedBlackTreeMap`].
#[derive(Clone)]
pub struct RedBlackNode<K, V> {
    key: K,
    value: V,
    color: Color,
    count: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> RedBlackNode<K, V> {
    /// Creates a new red node with no children.
    fn new_red(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            color: Color::Red,
            count: 1,
            left: None,
            right: None,
        })
    }

    /// Returns the color of the link from this node to its parent.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Checks if this node is red.
    #[must_use]
    pub const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    /// Returns the number of nodes in the subtree rooted at this node.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    fn update_count(&mut self) {
        self.count = 1 + count(self.left.as_deref()) + count(self.right.as_deref());
    }
}

/// Helper function to check if an optional node is red. Absent nodes are black.
fn is_red<K, V>(node: Option<&RedBlackNode<K, V>>) -> bool {
    node.is_some_and(RedBlackNode::is_red)
}

/// Checks if the left child of an optional node is red.
fn is_red_left_child<K, V>(node: Option<&RedBlackNode<K, V>>) -> bool {
    node.is_some_and(|node| is_red(node.left.as_deref()))
}

fn count<K, V>(node: Option<&RedBlackNode<K, V>>) -> usize {
    node.map_or(0, |node| node.count)
}

impl<K, V> BinaryNode for RedBlackNode<K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

// =============================================================================
// RedBlackTreeMap Definition
// =============================================================================

/// An ordered map based on a left-leaning red-black tree.
///
/// Keys must implement `Ord`. Keys are unique: inserting an existing key
/// replaces its value and leaves the length unchanged.
///
/// # Time Complexity
///
/// | Operation          | Complexity        |
/// |--------------------|-------------------|
/// | `new`              | O(1)              |
/// | `get`              | O(log N)          |
/// | `insert`           | O(log N)          |
/// | `remove`           | O(log N)          |
/// | `min`/`max`        | O(log N)          |
/// | `floor`/`ceiling`  | O(log N)          |
/// | `rank`/`select`    | O(log N)          |
/// | `range`            | O(log N + k)      |
/// | `range_len`        | O(log N)          |
/// | `len`              | O(1)              |
///
/// # Examples
///
/// ```rust
/// use balanced_forest::tree::RedBlackTreeMap;
///
/// let map: RedBlackTreeMap<i32, &str> = [(6, "f"), (8, "h"), (7, "g"), (4, "d")]
///     .into_iter()
///     .collect();
///
/// assert_eq!(map.rank(&7), 2);
/// assert_eq!(map.select(2), Some((&7, &"g")));
/// assert_eq!(map.select(4), None);
/// ```
#[derive(Clone)]
pub struct RedBlackTreeMap<K, V> {
    /// Root node of the tree
    root: Link<K, V>,
    /// Number of entries
    length: usize,
}

assert_impl_all!(RedBlackTreeMap<i32, String>: Send, Sync, Clone, Default);

impl<K, V> RedBlackTreeMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let map: RedBlackTreeMap<i32, String> = RedBlackTreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn height(&self) -> usize {
        fn subtree_height<K, V>(node: Option<&RedBlackNode<K, V>>) -> usize {
            node.map_or(0, |node| {
                1 + subtree_height(node.left.as_deref()).max(subtree_height(node.right.as_deref()))
            })
        }
        subtree_height(self.root.as_deref())
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        tracing::trace!(released = self.length, "clearing red-black tree");
        self.root = None;
        self.length = 0;
    }

    /// Returns the entry with the minimum key.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the maximum key.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry whose key has the given rank (0-indexed), i.e. the
    /// entry with exactly `rank` smaller keys.
    ///
    /// Returns `None` when `rank >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let map: RedBlackTreeMap<char, u32> = [('b', 2), ('a', 1), ('c', 3)].into_iter().collect();
    /// assert_eq!(map.select(0), Some((&'a', &1)));
    /// assert_eq!(map.select(2), Some((&'c', &3)));
    /// assert_eq!(map.select(3), None);
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<(&K, &V)> {
        if rank >= self.length {
            return None;
        }
        let mut remaining = rank;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_count = count(node.left.as_deref());
            match remaining.cmp(&left_count) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => {
                    remaining -= left_count + 1;
                    current = node.right.as_deref();
                }
                Ordering::Equal => return Some((&node.key, &node.value)),
            }
        }
        None
    }

    /// Removes and returns the entry with the minimum key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let mut map: RedBlackTreeMap<i32, char> = [(2, 'b'), (1, 'a')].into_iter().collect();
    /// assert_eq!(map.remove_min(), Some((1, 'a')));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        let root = Self::redden_root_for_removal(self.root.take()?);
        let (root, min) = Self::detach_min(root);
        self.root = root;
        self.blacken_root();
        self.length -= 1;
        let RedBlackNode { key, value, .. } = *min;
        Some((key, value))
    }

    /// Removes and returns the entry with the maximum key.
    pub fn remove_max(&mut self) -> Option<(K, V)> {
        let root = Self::redden_root_for_removal(self.root.take()?);
        let (root, max) = Self::detach_max(root);
        self.root = root;
        self.blacken_root();
        self.length -= 1;
        let RedBlackNode { key, value, .. } = *max;
        Some((key, value))
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator is a snapshot taken when it is created.
    #[must_use]
    pub fn iter(&self) -> Traversal<'_, K, V> {
        traverse(self, TraversalOrder::InOrder)
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Walks the tree in the given order.
    #[must_use]
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_, K, V> {
        traverse(self, order)
    }

    // =========================================================================
    // Rebalancing
    // =========================================================================

    //              node                      right
    //              /  \                      /  \
    //             /   (r)                  (r)   \
    //            /      \                  /      \
    //          left    right    =>      node       c
    //                  /  \             /  \
    //                 b    c         left   b
    fn rotate_left(mut node: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        let Some(mut right) = node.right.take() else {
            return node;
        };
        node.right = right.left.take();
        right.color = node.color;
        node.color = Color::Red;
        right.count = node.count;
        node.update_count();
        right.left = Some(node);
        right
    }

    //              node                  left
    //              /  \                  /  \
    //            (r)   \                /   (r)
    //            /      \              /      \
    //          left    right   =>     a       node
    //          /  \                           /  \
    //         a    b                         b   right
    fn rotate_right(mut node: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        let Some(mut left) = node.left.take() else {
            return node;
        };
        node.left = left.right.take();
        left.color = node.color;
        node.color = Color::Red;
        left.count = node.count;
        node.update_count();
        left.right = Some(node);
        left
    }

    /// Flips the color of a node and of both its children.
    fn flip_colors(node: &mut RedBlackNode<K, V>) {
        node.color = node.color.flipped();
        if let Some(left) = node.left.as_deref_mut() {
            left.color = left.color.flipped();
        }
        if let Some(right) = node.right.as_deref_mut() {
            right.color = right.color.flipped();
        }
    }

    /// Assuming `node` is red and both its children are black, makes the
    /// left child or one of its children red.
    fn move_red_left(mut node: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        Self::flip_colors(&mut node);
        if is_red_left_child(node.right.as_deref()) {
            if let Some(right) = node.right.take() {
                node.right = Some(Self::rotate_right(right));
            }
            node = Self::rotate_left(node);
            Self::flip_colors(&mut node);
        }
        node
    }

    /// Assuming `node` is red and both its children are black, makes the
    /// right child or one of its children red.
    fn move_red_right(mut node: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        Self::flip_colors(&mut node);
        if is_red_left_child(node.left.as_deref()) {
            node = Self::rotate_right(node);
            Self::flip_colors(&mut node);
        }
        node
    }

    /// Restores the LLRB invariants at `node` on the way back up and
    /// recomputes its count.
    fn balance(mut node: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        if is_red(node.right.as_deref()) && !is_red(node.left.as_deref()) {
            node = Self::rotate_left(node);
        }
        if is_red(node.left.as_deref()) && is_red_left_child(node.left.as_deref()) {
            node = Self::rotate_right(node);
        }
        if is_red(node.left.as_deref()) && is_red(node.right.as_deref()) {
            Self::flip_colors(&mut node);
        }
        node.update_count();
        node
    }

    /// Colors the root red when both its children are black, so that the
    /// removal descent always has a red link to borrow from.
    fn redden_root_for_removal(mut root: Box<RedBlackNode<K, V>>) -> Box<RedBlackNode<K, V>> {
        if !is_red(root.left.as_deref()) && !is_red(root.right.as_deref()) {
            root.color = Color::Red;
        }
        root
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root.as_deref_mut() {
            root.color = Color::Black;
        }
    }

    /// Detaches the minimum node of the subtree.
    /// Returns (`new_subtree`, `detached_node`).
    fn detach_min(mut node: Box<RedBlackNode<K, V>>) -> (Link<K, V>, Box<RedBlackNode<K, V>>) {
        if node.left.is_none() {
            let right = node.right.take();
            return (right, node);
        }
        if !is_red(node.left.as_deref()) && !is_red_left_child(node.left.as_deref()) {
            node = Self::move_red_left(node);
        }
        match node.left.take() {
            Some(left) => {
                let (left, min) = Self::detach_min(left);
                node.left = left;
                (Some(Self::balance(node)), min)
            }
            None => {
                let right = node.right.take();
                (right, node)
            }
        }
    }

    /// Detaches the maximum node of the subtree.
    fn detach_max(mut node: Box<RedBlackNode<K, V>>) -> (Link<K, V>, Box<RedBlackNode<K, V>>) {
        if is_red(node.left.as_deref()) {
            node = Self::rotate_right(node);
        }
        if node.right.is_none() {
            let left = node.left.take();
            return (left, node);
        }
        if !is_red(node.right.as_deref()) && !is_red_left_child(node.right.as_deref()) {
            node = Self::move_red_right(node);
        }
        match node.right.take() {
            Some(right) => {
                let (right, max) = Self::detach_max(right);
                node.right = right;
                (Some(Self::balance(node)), max)
            }
            None => {
                let left = node.left.take();
                (left, node)
            }
        }
    }

    /// Moves every entry out of the subtree in ascending key order.
    fn drain_in_order(link: Link<K, V>, entries: &mut Vec<(K, V)>) {
        if let Some(node) = link {
            let RedBlackNode {
                key,
                value,
                left,
                right,
                ..
            } = *node;
            Self::drain_in_order(left, entries);
            entries.push((key, value));
            Self::drain_in_order(right, entries);
        }
    }
}

impl<K: Ord, V> RedBlackTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let mut map = RedBlackTreeMap::new();
    /// map.insert("hello".to_string(), 42);
    ///
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced in place
    /// and the old value is returned.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (mut root, replaced) = Self::insert_into_node(self.root.take(), key, value);
        root.color = Color::Black;
        self.root = Some(root);
        if replaced.is_none() {
            self.length += 1;
        }
        replaced
    }

    /// Inserts `Some(value)` or removes the key when given `None`.
    ///
    /// Returns the previous value for the key, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let mut map = RedBlackTreeMap::new();
    /// map.put(9, Some("Marcelo"));
    /// map.put(9, Some("Matilda"));
    /// assert_eq!(map.get(&9), Some(&"Matilda"));
    ///
    /// map.put(9, None);
    /// assert!(map.is_empty());
    /// ```
    pub fn put(&mut self, key: K, value: Option<V>) -> Option<V> {
        match value {
            Some(value) => self.insert(key, value),
            None => {
                tracing::trace!("put without a value, removing the key");
                self.remove(&key)
            }
        }
    }

    /// Recursive helper for insert.
    /// Returns (`new_node`, `replaced_value`).
    fn insert_into_node(
        link: Link<K, V>,
        key: K,
        value: V,
    ) -> (Box<RedBlackNode<K, V>>, Option<V>) {
        let Some(mut node) = link else {
            return (RedBlackNode::new_red(key, value), None);
        };
        let replaced = match key.cmp(&node.key) {
            Ordering::Less => {
                let (left, replaced) = Self::insert_into_node(node.left.take(), key, value);
                node.left = Some(left);
                replaced
            }
            Ordering::Greater => {
                let (right, replaced) = Self::insert_into_node(node.right.take(), key, value);
                node.right = Some(right);
                replaced
            }
            Ordering::Equal => Some(mem::replace(&mut node.value, value)),
        };
        (Self::balance(node), replaced)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Removing an absent key leaves the tree untouched.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let mut map: RedBlackTreeMap<i32, i32> = (0..10).map(|key| (key, key)).collect();
    /// assert_eq!(map.remove(&4), Some(4));
    /// assert_eq!(map.remove(&4), None);
    /// assert_eq!(map.rank(&5), 4);
    /// assert!(map.verify().is_ok());
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.contains_key(key) {
            return None;
        }
        let root = Self::redden_root_for_removal(self.root.take()?);
        let (root, removed) = Self::remove_from_node(root, key);
        self.root = root;
        self.blacken_root();
        if removed.is_some() {
            self.length -= 1;
        }
        removed
    }

    /// Recursive helper for remove. The key must be present in the subtree.
    fn remove_from_node<Q>(mut node: Box<RedBlackNode<K, V>>, key: &Q) -> (Link<K, V>, Option<V>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if key < node.key.borrow() {
            if !is_red(node.left.as_deref()) && !is_red_left_child(node.left.as_deref()) {
                node = Self::move_red_left(node);
            }
            let removed = match node.left.take() {
                Some(left) => {
                    let (left, removed) = Self::remove_from_node(left, key);
                    node.left = left;
                    removed
                }
                None => None,
            };
            return (Some(Self::balance(node)), removed);
        }

        if is_red(node.left.as_deref()) {
            node = Self::rotate_right(node);
        }
        if key == node.key.borrow() && node.right.is_none() {
            let RedBlackNode { value, left, .. } = *node;
            return (left, Some(value));
        }
        if !is_red(node.right.as_deref()) && !is_red_left_child(node.right.as_deref()) {
            node = Self::move_red_right(node);
        }

        let removed = match node.right.take() {
            Some(right) if key == node.key.borrow() => {
                // The in-order successor's entry moves into this node.
                let (right, mut successor) = Self::detach_min(right);
                node.right = right;
                mem::swap(&mut node.key, &mut successor.key);
                mem::swap(&mut node.value, &mut successor.value);
                Some(successor.value)
            }
            Some(right) => {
                let (right, removed) = Self::remove_from_node(right, key);
                node.right = right;
                removed
            }
            None => None,
        };
        (Some(Self::balance(node)), removed)
    }

    /// Returns the largest key less than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let map: RedBlackTreeMap<i32, ()> = [10, 20, 30].into_iter().map(|key| (key, ())).collect();
    /// assert_eq!(map.floor(&25), Some(&20));
    /// assert_eq!(map.floor(&20), Some(&20));
    /// assert_eq!(map.floor(&5), None);
    /// ```
    #[must_use]
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => {
                    best = Some(&node.key);
                    current = node.right.as_deref();
                }
            }
        }
        best
    }

    /// Returns the smallest key greater than or equal to `key`.
    #[must_use]
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Less => {
                    best = Some(&node.key);
                    current = node.left.as_deref();
                }
            }
        }
        best
    }

    /// Returns the number of keys strictly less than `key`.
    ///
    /// `key` need not be present in the map.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut rank = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => {
                    rank += 1 + count(node.left.as_deref());
                    current = node.right.as_deref();
                }
                Ordering::Equal => return rank + count(node.left.as_deref()),
            }
        }
        rank
    }

    /// Returns the number of keys in `[low, high]`, or 0 when `low > high`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let map: RedBlackTreeMap<i32, ()> = (1..=9).map(|key| (key, ())).collect();
    /// assert_eq!(map.range_len(&3, &6), 4);
    /// assert_eq!(map.range_len(&0, &100), 9);
    /// assert_eq!(map.range_len(&6, &3), 0);
    /// ```
    #[must_use]
    pub fn range_len<Q>(&self, low: &Q, high: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if low > high {
            return 0;
        }
        let span = self.rank(high) - self.rank(low);
        if self.contains_key(high) {
            span + 1
        } else {
            span
        }
    }

    /// Returns an iterator over the entries whose keys fall in `range`, in
    /// ascending key order.
    ///
    /// Subtrees entirely outside the range are never visited.
    ///
    /// # Complexity
    ///
    /// O(log N + k) where k is the number of results
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::RedBlackTreeMap;
    ///
    /// let map: RedBlackTreeMap<i32, ()> = (1..=9).map(|key| (key, ())).collect();
    ///
    /// let keys: Vec<&i32> = map.range(3..6).map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![&3, &4, &5]);
    ///
    /// let tail: Vec<&i32> = map.range(8..).map(|(key, _)| key).collect();
    /// assert_eq!(tail, vec![&8, &9]);
    /// ```
    pub fn range<R, Q>(&self, range: R) -> RedBlackTreeMapRangeIterator<'_, K, V>
    where
        R: RangeBounds<Q>,
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut entries = Vec::new();
        Self::collect_range(self.root.as_deref(), &range, &mut entries);
        RedBlackTreeMapRangeIterator {
            entries,
            current_index: 0,
        }
    }

    /// In-order walk that skips subtrees outside the range.
    fn collect_range<'a, R, Q>(
        node: Option<&'a RedBlackNode<K, V>>,
        range: &R,
        entries: &mut Vec<(&'a K, &'a V)>,
    ) where
        R: RangeBounds<Q>,
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = node else {
            return;
        };
        let key: &Q = node.key.borrow();

        let visit_left = match range.start_bound() {
            Bound::Included(start) | Bound::Excluded(start) => start < key,
            Bound::Unbounded => true,
        };
        let visit_right = match range.end_bound() {
            Bound::Included(end) | Bound::Excluded(end) => end > key,
            Bound::Unbounded => true,
        };

        if visit_left {
            Self::collect_range(node.left.as_deref(), range, entries);
        }
        if range.contains(key) {
            entries.push((&node.key, &node.value));
        }
        if visit_right {
            Self::collect_range(node.right.as_deref(), range, entries);
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Verifies symmetric order, subtree counts, the length counter,
    /// rank/select consistency, the 2-3 shape (no red right links, no two
    /// reds in a row), uniform black height and a black root. This is a
    /// diagnostic pass meant for tests; it runs in O(N log N).
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantError`] listing every violation found.
    pub fn verify(&self) -> Result<(), InvariantError> {
        let mut violations = Vec::new();

        if is_red(self.root.as_deref()) {
            violations.push(Violation::RedRoot);
        }

        let mut position = 0;
        let mut previous = None;
        Self::verify_node(
            self.root.as_deref(),
            &mut position,
            &mut previous,
            &mut violations,
        );
        if position != self.length {
            violations.push(Violation::SizeMismatch {
                reported: self.length,
                actual: position,
            });
        }

        for (rank, (key, _)) in self.iter().enumerate() {
            let selected = self.select(rank).map(|(selected, _)| selected);
            if self.rank(key) != rank || selected != Some(key) {
                violations.push(Violation::RankMismatch { rank });
            }
        }

        InvariantError::check(violations)
    }

    /// Checks the subtree and returns its recomputed (`count`, `black_height`).
    fn verify_node<'a>(
        node: Option<&'a RedBlackNode<K, V>>,
        position: &mut usize,
        previous: &mut Option<&'a K>,
        violations: &mut Vec<Violation>,
    ) -> (usize, usize) {
        let Some(node) = node else {
            return (0, 0);
        };

        let (left_count, left_black) =
            Self::verify_node(node.left.as_deref(), position, previous, violations);

        let here = *position;
        if let Some(previous_key) = *previous
            && previous_key >= &node.key
        {
            violations.push(Violation::Unordered { position: here });
        }
        *previous = Some(&node.key);
        *position += 1;

        let (right_count, right_black) =
            Self::verify_node(node.right.as_deref(), position, previous, violations);

        let computed = 1 + left_count + right_count;
        if node.count != computed {
            violations.push(Violation::StaleCount {
                position: here,
                stored: node.count,
                computed,
            });
        }
        if is_red(node.right.as_deref()) {
            violations.push(Violation::RedRightLink { position: here });
        }
        if node.is_red() && is_red(node.left.as_deref()) {
            violations.push(Violation::ConsecutiveRedLinks { position: here });
        }
        if left_black != right_black {
            violations.push(Violation::BlackHeightMismatch {
                position: here,
                left: left_black,
                right: right_black,
            });
        }

        let black_height = if node.is_red() {
            left_black
        } else {
            left_black + 1
        };
        (computed, black_height)
    }
}

impl<K, V> BinaryTree for RedBlackTreeMap<K, V> {
    type Node = RedBlackNode<K, V>;

    fn root(&self) -> Option<&RedBlackNode<K, V>> {
        self.root.as_deref()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Iterator returned by [`RedBlackTreeMap::range`].
pub struct RedBlackTreeMapRangeIterator<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    current_index: usize,
}

impl<'a, K, V> Iterator for RedBlackTreeMapRangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.current_index).copied()?;
        self.current_index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for RedBlackTreeMapRangeIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

/// Owning iterator over the entries of a [`RedBlackTreeMap`] in ascending key order.
pub struct RedBlackTreeMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for RedBlackTreeMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for RedBlackTreeMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for RedBlackTreeMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for RedBlackTreeMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RedBlackTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for RedBlackTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for RedBlackTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = RedBlackTreeMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let mut entries = Vec::with_capacity(self.length);
        Self::drain_in_order(self.root, &mut entries);
        RedBlackTreeMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RedBlackTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Traversal<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RedBlackTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for RedBlackTreeMap<K, V> {}

impl<K: Hash, V: Hash> Hash for RedBlackTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RedBlackTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

/// Draws the tree, one `key: value` node per line; red nodes are marked `(red)`.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for RedBlackTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_tree(formatter, self.root.as_deref(), |node, formatter| {
            write!(formatter, "{}: {}", node.key, node.value)?;
            if node.is_red() {
                formatter.write_str(" (red)")?;
            }
            Ok(())
        })
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for RedBlackTreeMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct RedBlackTreeMapVisitor<K, V> {
    marker: std::marker::PhantomData<fn() -> RedBlackTreeMap<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for RedBlackTreeMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = RedBlackTreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = RedBlackTreeMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for RedBlackTreeMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(RedBlackTreeMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MIXED_KEYS: [i32; 7] = [6, 8, 7, 4, 5, 9, 3];

    fn map_of(keys: &[i32]) -> RedBlackTreeMap<i32, i32> {
        keys.iter().map(|&key| (key, key * 10)).collect()
    }

    fn node(key: i32, color: Color) -> Box<RedBlackNode<i32, i32>> {
        let mut node = RedBlackNode::new_red(key, key);
        node.color = color;
        node
    }

    /// Shape of the subtree as (key, color) in pre-order.
    fn shape(node: Option<&RedBlackNode<i32, i32>>, out: &mut Vec<(i32, Color)>) {
        if let Some(node) = node {
            out.push((node.key, node.color));
            shape(node.left.as_deref(), out);
            shape(node.right.as_deref(), out);
        }
    }

    fn pre_order_shape(map: &RedBlackTreeMap<i32, i32>) -> Vec<(i32, Color)> {
        let mut out = Vec::new();
        shape(map.root.as_deref(), &mut out);
        out
    }

    // =========================================================================
    // Rotation and Color Flip Tests
    // =========================================================================

    #[rstest]
    fn test_rotate_left_transfers_color_and_count() {
        let mut root = node(1, Color::Black);
        root.right = Some(node(2, Color::Red));
        root.update_count();

        let rotated = RedBlackTreeMap::rotate_left(root);
        assert_eq!(rotated.key, 2);
        assert_eq!(rotated.color, Color::Black);
        assert_eq!(rotated.count, 2);
        let demoted = rotated.left.as_deref().map(|left| (left.key, left.color, left.count));
        assert_eq!(demoted, Some((1, Color::Red, 1)));
    }

    #[rstest]
    fn test_rotate_right_transfers_color_and_count() {
        let mut root = node(3, Color::Red);
        let mut left = node(2, Color::Red);
        left.left = Some(node(1, Color::Black));
        left.update_count();
        root.left = Some(left);
        root.update_count();

        let rotated = RedBlackTreeMap::rotate_right(root);
        assert_eq!((rotated.key, rotated.color, rotated.count), (2, Color::Red, 3));
        let demoted = rotated.right.as_deref().map(|right| (right.key, right.color, right.count));
        assert_eq!(demoted, Some((3, Color::Red, 1)));
    }

    #[rstest]
    fn test_flip_colors_toggles_node_and_children() {
        let mut root = node(2, Color::Black);
        root.left = Some(node(1, Color::Red));
        root.right = Some(node(3, Color::Red));
        RedBlackTreeMap::flip_colors(&mut root);
        assert_eq!(root.color, Color::Red);
        assert_eq!(root.left.as_deref().map(RedBlackNode::color), Some(Color::Black));
        assert_eq!(root.right.as_deref().map(RedBlackNode::color), Some(Color::Black));
    }

    #[rstest]
    fn test_move_red_left_borrows_from_right_sibling() {
        //      2 (red)
        //     /   \
        //    1     4
        //         /
        //       3 (red)
        let mut root = node(2, Color::Red);
        root.left = Some(node(1, Color::Black));
        let mut right = node(4, Color::Black);
        right.left = Some(node(3, Color::Red));
        right.update_count();
        root.right = Some(right);
        root.update_count();

        let moved = RedBlackTreeMap::move_red_left(root);
        assert_eq!((moved.key, moved.color), (3, Color::Red));
        let left = moved.left.as_deref().map(|left| (left.key, left.color));
        let left_left = moved
            .left
            .as_deref()
            .and_then(|left| left.left.as_deref())
            .map(|node| (node.key, node.color));
        assert_eq!(left, Some((2, Color::Black)));
        assert_eq!(left_left, Some((1, Color::Red)));
    }

    // =========================================================================
    // Shape Tests
    // =========================================================================

    #[rstest]
    fn test_insert_keeps_left_leaning_shape() {
        let map = map_of(&MIXED_KEYS);
        assert_eq!(
            pre_order_shape(&map),
            vec![
                (7, Color::Black),
                (5, Color::Red),
                (4, Color::Black),
                (3, Color::Red),
                (6, Color::Black),
                (9, Color::Black),
                (8, Color::Red),
            ]
        );
        assert_eq!(map.root.as_deref().map(RedBlackNode::count), Some(7));
    }

    #[rstest]
    fn test_ascending_inserts_stay_balanced() {
        let map = map_of(&(0..255).collect::<Vec<_>>());
        assert_eq!(map.verify(), Ok(()));
        assert!(map.height() <= 16);
    }

    #[rstest]
    fn test_remove_keeps_invariants_at_every_step() {
        let mut map = map_of(&(0..64).collect::<Vec<_>>());
        for key in (0..64).step_by(3) {
            assert_eq!(map.remove(&key), Some(key * 10));
            assert_eq!(map.verify(), Ok(()));
        }
        for key in (0..64).rev() {
            map.remove(&key);
            assert_eq!(map.verify(), Ok(()));
        }
        assert!(map.is_empty());
        assert!(map.root.is_none());
    }

    #[rstest]
    fn test_remove_min_and_max_keep_invariants() {
        let mut map = map_of(&(1..=40).collect::<Vec<_>>());
        for expected in 1..=15 {
            assert_eq!(map.remove_min(), Some((expected, expected * 10)));
            assert_eq!(map.verify(), Ok(()));
        }
        for expected in (26..=40).rev() {
            assert_eq!(map.remove_max(), Some((expected, expected * 10)));
            assert_eq!(map.verify(), Ok(()));
        }
        assert_eq!(map.len(), 10);
        assert_eq!(map.min(), Some((&16, &160)));
        assert_eq!(map.max(), Some((&25, &250)));
    }

    // =========================================================================
    // Verify Tests
    // =========================================================================

    #[rstest]
    fn test_verify_reports_red_right_link_and_black_height() {
        let mut root = node(1, Color::Black);
        root.right = Some(node(2, Color::Red));
        root.update_count();
        let map = RedBlackTreeMap {
            root: Some(root),
            length: 2,
        };
        assert_eq!(
            map.verify().unwrap_err().violations(),
            &[Violation::RedRightLink { position: 0 }]
        );

        let mut root = node(1, Color::Black);
        root.right = Some(node(2, Color::Black));
        root.update_count();
        let map = RedBlackTreeMap {
            root: Some(root),
            length: 2,
        };
        assert_eq!(
            map.verify().unwrap_err().violations(),
            &[Violation::BlackHeightMismatch {
                position: 0,
                left: 0,
                right: 1,
            }]
        );
    }

    #[rstest]
    fn test_verify_reports_stale_count_and_red_root() {
        let mut map = map_of(&[1, 2, 3]);
        if let Some(root) = map.root.as_deref_mut() {
            root.count = 5;
            root.color = Color::Red;
        }
        let violations = map.verify().unwrap_err().into_violations();
        assert_eq!(violations[0], Violation::RedRoot);
        assert!(violations.contains(&Violation::StaleCount {
            position: 1,
            stored: 5,
            computed: 3,
        }));
    }

    #[rstest]
    fn test_verify_reports_consecutive_red_links() {
        let mut root = node(3, Color::Black);
        let mut left = node(2, Color::Red);
        left.left = Some(node(1, Color::Red));
        left.update_count();
        root.left = Some(left);
        root.update_count();
        let map = RedBlackTreeMap {
            root: Some(root),
            length: 3,
        };
        let violations = map.verify().unwrap_err().into_violations();
        assert!(violations.contains(&Violation::ConsecutiveRedLinks { position: 1 }));
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_marks_red_nodes() {
        let map: RedBlackTreeMap<i32, char> = MIXED_KEYS
            .into_iter()
            .map(|key| (key, char::from(b'a' + u8::try_from(key - 1).unwrap())))
            .collect();
        let expected = "\
7: g
├─ 5: e (red)
│  ├─ 4: d
│  │  ├─ 3: c (red)
│  │  └─ ∅
│  └─ 6: f
└─ 9: i
   ├─ 8: h (red)
   └─ ∅";
        assert_eq!(format!("{map}"), expected);
    }

    #[rstest]
    fn test_display_empty_tree() {
        let map: RedBlackTreeMap<i32, i32> = RedBlackTreeMap::new();
        assert_eq!(map.to_string(), "∅");
    }
}
