//! AVL tree map.
//!
//! This module provides [`AvlTreeMap`], an ordered map backed by a
//! height-balanced binary search tree.
//!
//! # Overview
//!
//! Every node caches the height of its subtree. After each structural
//! change the ancestors of the changed node are rebalanced bottom-up, so
//! that for every node `|height(left) - height(right)| <= 1`.
//!
//! - O(log N) get
//! - O(log N) insert
//! - O(log N) remove
//! - O(log N) min/max
//! - O(1) len and `is_empty`
//!
//! # Height Convention
//!
//! An absent subtree has height 0 and a leaf has height 1, so the height
//! of a tree is the number of nodes on its longest root-to-leaf path.
//!
//! # Examples
//!
//! ```rust
//! use balanced_forest::tree::AvlTreeMap;
//!
//! let mut map = AvlTreeMap::new();
//! for key in 1..=7 {
//!     map.insert(key, key * key);
//! }
//!
//! // Ascending inserts stay perfectly balanced.
//! assert_eq!(map.height(), 3);
//! assert_eq!(map.get(&5), Some(&25));
//! assert!(map.verify().is_ok());
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::mem;

use static_assertions::assert_impl_all;

use super::render::render_tree;
use super::traversal::{BinaryNode, BinaryTree, Traversal, TraversalOrder, traverse};
use crate::error::{InvariantError, Violation};

type Link<K, V> = Option<Box<AvlNode<K, V>>>;

// =============================================================================
// Node Definition
// =============================================================================

/// A node of an [`AvlTreeMap`].
///
/// Nodes are only reachable read-only, through [`BinaryTree::root`] and
/// the [`BinaryNode`] accessors.
#[derive(Clone)]
pub struct AvlNode<K, V> {
    key: K,
    value: V,
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> AvlNode<K, V> {
    /// Creates a new leaf.
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    /// Returns the height of the subtree rooted at this node (a leaf has height 1).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns `height(left) - height(right)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn balance_factor(&self) -> isize {
        height(self.left.as_deref()) as isize - height(self.right.as_deref()) as isize
    }

    fn update_height(&mut self) {
        self.height = 1 + height(self.left.as_deref()).max(height(self.right.as_deref()));
    }
}

/// Height of an optional subtree; an absent subtree has height 0.
fn height<K, V>(node: Option<&AvlNode<K, V>>) -> usize {
    node.map_or(0, |node| node.height)
}

impl<K, V> BinaryNode for AvlNode<K, V> {
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
// AvlTreeMap Definition
// =============================================================================

/// An ordered map based on an AVL tree.
///
/// Keys must implement `Ord`. Keys are unique: inserting an existing key
/// replaces its value and leaves the length unchanged.
///
/// The map is a plain single-owner structure: it is `Send`/`Sync` when
/// `K` and `V` are, and shared mutation needs an external lock.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `insert`       | O(log N)          |
/// | `remove`       | O(log N)          |
/// | `contains_key` | O(log N)          |
/// | `min`/`max`    | O(log N)          |
/// | `traverse`     | O(N)              |
/// | `len`          | O(1)              |
///
/// # Examples
///
/// ```rust
/// use balanced_forest::tree::AvlTreeMap;
///
/// let mut map = AvlTreeMap::new();
/// map.insert(9, "Marcelo");
/// map.insert(9, "Matilda");
///
/// assert_eq!(map.get(&9), Some(&"Matilda"));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    /// Root node of the tree
    root: Link<K, V>,
    /// Number of entries
    length: usize,
}

assert_impl_all!(AvlTreeMap<i32, String>: Send, Sync, Clone, Default);

impl<K, V> AvlTreeMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, String> = AvlTreeMap::new();
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

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    #[must_use]
    pub fn height(&self) -> usize {
        height(self.root.as_deref())
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        tracing::trace!(released = self.length, "clearing AVL tree");
        self.root = None;
        self.length = 0;
    }

    /// Returns the entry with the minimum key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
    /// assert_eq!(map.min(), Some((&1, &"a")));
    ///
    /// let empty: AvlTreeMap<i32, &str> = AvlTreeMap::new();
    /// assert_eq!(empty.min(), None);
    /// ```
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

    /// Removes and returns the entry with the minimum key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, char> = [(2, 'b'), (1, 'a')].into_iter().collect();
    /// assert_eq!(map.remove_min(), Some((1, 'a')));
    /// assert_eq!(map.remove_min(), Some((2, 'b')));
    /// assert_eq!(map.remove_min(), None);
    /// ```
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        let root = self.root.take()?;
        let (root, min) = Self::detach_min(root);
        self.root = root;
        self.length -= 1;
        let AvlNode { key, value, .. } = *min;
        Some((key, value))
    }

    /// Removes and returns the entry with the maximum key.
    pub fn remove_max(&mut self) -> Option<(K, V)> {
        let root = self.root.take()?;
        let (root, max) = Self::detach_max(root);
        self.root = root;
        self.length -= 1;
        let AvlNode { key, value, .. } = *max;
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
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::{AvlTreeMap, TraversalOrder};
    ///
    /// let map: AvlTreeMap<i32, ()> = (1..=3).map(|key| (key, ())).collect();
    ///
    /// let post_order: Vec<&i32> = map
    ///     .traverse(TraversalOrder::PostOrder)
    ///     .map(|(key, _)| key)
    ///     .collect();
    /// assert_eq!(post_order, vec![&1, &3, &2]);
    /// ```
    #[must_use]
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_, K, V> {
        traverse(self, order)
    }

    // =========================================================================
    // Rebalancing
    // =========================================================================

    /// Restores the AVL property at `node`, assuming both subtrees are
    /// valid AVL trees whose heights differ by at most two.
    fn balance(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
        let left_height = height(node.left.as_deref());
        let right_height = height(node.right.as_deref());

        if left_height > right_height + 1 {
            let outer_heavy = node.left.as_deref().is_some_and(|left| {
                height(left.left.as_deref()) >= height(left.right.as_deref())
            });
            node = if outer_heavy {
                Self::rotate_with_left_child(node)
            } else {
                Self::double_with_left_child(node)
            };
        } else if right_height > left_height + 1 {
            let outer_heavy = node.right.as_deref().is_some_and(|right| {
                height(right.right.as_deref()) >= height(right.left.as_deref())
            });
            node = if outer_heavy {
                Self::rotate_with_right_child(node)
            } else {
                Self::double_with_right_child(node)
            };
        }

        node.update_height();
        node
    }

    //          node                left
    //          /  \                /  \
    //       left   c     =>       a   node
    //       /  \                      /  \
    //      a    b                    b    c
    fn rotate_with_left_child(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
        let Some(mut left) = node.left.take() else {
            return node;
        };
        node.left = left.right.take();
        node.update_height();
        left.right = Some(node);
        left.update_height();
        left
    }

    //       node                    right
    //       /  \                    /  \
    //      a   right     =>      node   c
    //          /  \              /  \
    //         b    c            a    b
    fn rotate_with_right_child(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
        let Some(mut right) = node.right.take() else {
            return node;
        };
        node.right = right.left.take();
        node.update_height();
        right.left = Some(node);
        right.update_height();
        right
    }

    /// Left-right case: lift the left child's right subtree, then rotate `node`.
    fn double_with_left_child(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
        if let Some(left) = node.left.take() {
            node.left = Some(Self::rotate_with_right_child(left));
        }
        Self::rotate_with_left_child(node)
    }

    /// Right-left case: lift the right child's left subtree, then rotate `node`.
    fn double_with_right_child(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
        if let Some(right) = node.right.take() {
            node.right = Some(Self::rotate_with_left_child(right));
        }
        Self::rotate_with_right_child(node)
    }

    /// Detaches the minimum node of the subtree.
    /// Returns (`new_subtree`, `detached_node`).
    fn detach_min(mut node: Box<AvlNode<K, V>>) -> (Link<K, V>, Box<AvlNode<K, V>>) {
        match node.left.take() {
            None => {
                let right = node.right.take();
                (right, node)
            }
            Some(left) => {
                let (left, min) = Self::detach_min(left);
                node.left = left;
                (Some(Self::balance(node)), min)
            }
        }
    }

    /// Detaches the maximum node of the subtree.
    fn detach_max(mut node: Box<AvlNode<K, V>>) -> (Link<K, V>, Box<AvlNode<K, V>>) {
        match node.right.take() {
            None => {
                let left = node.left.take();
                (left, node)
            }
            Some(right) => {
                let (right, max) = Self::detach_max(right);
                node.right = right;
                (Some(Self::balance(node)), max)
            }
        }
    }

    /// Moves every entry out of the subtree in ascending key order.
    fn drain_in_order(link: Link<K, V>, entries: &mut Vec<(K, V)>) {
        if let Some(node) = link {
            let AvlNode {
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

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form must match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
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
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert(1, "one"), None);
    /// assert_eq!(map.insert(1, "ONE"), Some("one"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, replaced) = Self::insert_into_node(self.root.take(), key, value);
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
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.put(3, Some("three"));
    /// assert!(map.contains_key(&3));
    ///
    /// assert_eq!(map.put(3, None), Some("three"));
    /// assert!(!map.contains_key(&3));
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
    fn insert_into_node(link: Link<K, V>, key: K, value: V) -> (Box<AvlNode<K, V>>, Option<V>) {
        let Some(mut node) = link else {
            return (AvlNode::leaf(key, value), None);
        };
        match key.cmp(&node.key) {
            Ordering::Less => {
                let (left, replaced) = Self::insert_into_node(node.left.take(), key, value);
                node.left = Some(left);
                (Self::balance(node), replaced)
            }
            Ordering::Greater => {
                let (right, replaced) = Self::insert_into_node(node.right.take(), key, value);
                node.right = Some(right);
                (Self::balance(node), replaced)
            }
            Ordering::Equal => {
                let replaced = mem::replace(&mut node.value, value);
                (node, Some(replaced))
            }
        }
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
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, &str> = [(1, "one"), (2, "two")].into_iter().collect();
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, removed) = Self::remove_from_node(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.length -= 1;
        }
        removed
    }

    /// Recursive helper for remove.
    fn remove_from_node<Q>(link: Link<K, V>, key: &Q) -> (Link<K, V>, Option<V>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut node) = link else {
            return (None, None);
        };
        match key.cmp(node.key.borrow()) {
            Ordering::Less => {
                let (left, removed) = Self::remove_from_node(node.left.take(), key);
                node.left = left;
                (Some(Self::balance(node)), removed)
            }
            Ordering::Greater => {
                let (right, removed) = Self::remove_from_node(node.right.take(), key);
                node.right = right;
                (Some(Self::balance(node)), removed)
            }
            Ordering::Equal => {
                let AvlNode {
                    value, left, right, ..
                } = *node;
                let replacement = match (left, right) {
                    (Some(left), Some(right)) => {
                        // The in-order successor takes the removed node's place.
                        let (right, mut successor) = Self::detach_min(right);
                        successor.left = Some(left);
                        successor.right = right;
                        Some(Self::balance(successor))
                    }
                    (left, None) => left,
                    (None, right) => right,
                };
                (replacement, Some(value))
            }
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Verifies that keys are strictly ascending in order, that every
    /// cached height matches its subtrees, that no node is out of balance
    /// and that the length counter matches the number of nodes. This is a
    /// diagnostic pass meant for tests; it runs in O(N).
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantError`] listing every violation found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    /// assert_eq!(map.verify(), Ok(()));
    /// ```
    pub fn verify(&self) -> Result<(), InvariantError> {
        let mut violations = Vec::new();
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
        InvariantError::check(violations)
    }

    /// Checks the subtree and returns its recomputed height.
    #[allow(clippy::cast_possible_wrap)]
    fn verify_node<'a>(
        node: Option<&'a AvlNode<K, V>>,
        position: &mut usize,
        previous: &mut Option<&'a K>,
        violations: &mut Vec<Violation>,
    ) -> usize {
        let Some(node) = node else {
            return 0;
        };

        let left_height = Self::verify_node(node.left.as_deref(), position, previous, violations);

        let here = *position;
        if let Some(previous_key) = *previous
            && previous_key >= &node.key
        {
            violations.push(Violation::Unordered { position: here });
        }
        *previous = Some(&node.key);
        *position += 1;

        let right_height = Self::verify_node(node.right.as_deref(), position, previous, violations);

        let computed = 1 + left_height.max(right_height);
        if node.height != computed {
            violations.push(Violation::StaleHeight {
                position: here,
                stored: node.height,
                computed,
            });
        }
        let factor = left_height as isize - right_height as isize;
        if factor.abs() > 1 {
            violations.push(Violation::Unbalanced {
                position: here,
                factor,
            });
        }
        computed
    }
}

impl<K, V> BinaryTree for AvlTreeMap<K, V> {
    type Node = AvlNode<K, V>;

    fn root(&self) -> Option<&AvlNode<K, V>> {
        self.root.as_deref()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Owning iterator over the entries of an [`AvlTreeMap`] in ascending key order.
pub struct AvlTreeMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for AvlTreeMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for AvlTreeMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for AvlTreeMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for AvlTreeMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = AvlTreeMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let mut entries = Vec::with_capacity(self.length);
        Self::drain_in_order(self.root, &mut entries);
        AvlTreeMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Traversal<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K: Hash, V: Hash> Hash for AvlTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

/// Draws the tree, one `key: value` node per line.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for AvlTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_tree(formatter, self.root.as_deref(), |node, formatter| {
            write!(formatter, "{}: {}", node.key, node.value)
        })
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for AvlTreeMap<K, V>
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
struct AvlTreeMapVisitor<K, V> {
    marker: std::marker::PhantomData<fn() -> AvlTreeMap<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for AvlTreeMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = AvlTreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = AvlTreeMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for AvlTreeMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(AvlTreeMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
