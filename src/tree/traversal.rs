//! Traversal of either tree in any of the classic orders.

use std::collections::VecDeque;

/// Read-only view of a tree node.
///
/// Implemented by [`AvlNode`](super::AvlNode) and
/// [`RedBlackNode`](super::RedBlackNode).
pub trait BinaryNode {
    /// The key type.
    type Key;
    /// The value type.
    type Value;

    /// Returns the node's key.
    fn key(&self) -> &Self::Key;

    /// Returns the node's value.
    fn value(&self) -> &Self::Value;

    /// Returns the left child, if any.
    fn left(&self) -> Option<&Self>;

    /// Returns the right child, if any.
    fn right(&self) -> Option<&Self>;
}

/// A tree whose nodes can be walked from the root.
pub trait BinaryTree {
    /// The node type of this tree.
    type Node: BinaryNode;

    /// Returns the root node, or `None` if the tree is empty.
    fn root(&self) -> Option<&Self::Node>;
}

/// The order in which [`traverse`] visits nodes.
///
/// Each `Reverse*` order yields exactly the reversed sequence of its
/// forward counterpart, so `ReverseInOrder` is descending key order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TraversalOrder {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, then node, then right subtree (ascending keys).
    InOrder,
    /// Left subtree, then right subtree, then node.
    PostOrder,
    /// Breadth first, left to right within each level.
    LevelOrder,
    /// Reverse of [`PreOrder`](Self::PreOrder).
    ReversePreOrder,
    /// Reverse of [`InOrder`](Self::InOrder) (descending keys).
    ReverseInOrder,
    /// Reverse of [`PostOrder`](Self::PostOrder).
    ReversePostOrder,
    /// Reverse of [`LevelOrder`](Self::LevelOrder).
    ReverseLevelOrder,
}

impl TraversalOrder {
    /// All eight orders, forward orders first.
    pub const ALL: [Self; 8] = [
        Self::PreOrder,
        Self::InOrder,
        Self::PostOrder,
        Self::LevelOrder,
        Self::ReversePreOrder,
        Self::ReverseInOrder,
        Self::ReversePostOrder,
        Self::ReverseLevelOrder,
    ];

    /// Returns the order that yields the reversed sequence of this one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use balanced_forest::tree::TraversalOrder;
    ///
    /// assert_eq!(TraversalOrder::InOrder.reversed(), TraversalOrder::ReverseInOrder);
    /// assert_eq!(TraversalOrder::ReverseLevelOrder.reversed(), TraversalOrder::LevelOrder);
    /// ```
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::PreOrder => Self::ReversePreOrder,
            Self::InOrder => Self::ReverseInOrder,
            Self::PostOrder => Self::ReversePostOrder,
            Self::LevelOrder => Self::ReverseLevelOrder,
            Self::ReversePreOrder => Self::PreOrder,
            Self::ReverseInOrder => Self::InOrder,
            Self::ReversePostOrder => Self::PostOrder,
            Self::ReverseLevelOrder => Self::LevelOrder,
        }
    }

    /// Returns `true` for the four `Reverse*` orders.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::ReversePreOrder
                | Self::ReverseInOrder
                | Self::ReversePostOrder
                | Self::ReverseLevelOrder
        )
    }
}

/// Walks `tree` in the given order.
///
/// The walk is materialized when this function is called: the returned
/// iterator is a snapshot of `(key, value)` references. It borrows the
/// tree, so the tree cannot be modified while the iterator is alive.
///
/// # Complexity
///
/// O(N) time and space
///
/// # Examples
///
/// ```rust
/// use balanced_forest::tree::{RedBlackTreeMap, TraversalOrder, traverse};
///
/// let map: RedBlackTreeMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
///
/// let descending: Vec<&char> = traverse(&map, TraversalOrder::ReverseInOrder)
///     .map(|(_, value)| value)
///     .collect();
/// assert_eq!(descending, vec![&'c', &'b', &'a']);
/// ```
pub fn traverse<T>(
    tree: &T,
    order: TraversalOrder,
) -> Traversal<'_, <T::Node as BinaryNode>::Key, <T::Node as BinaryNode>::Value>
where
    T: BinaryTree,
{
    let mut entries = Vec::new();
    if let Some(root) = tree.root() {
        match order {
            TraversalOrder::PreOrder | TraversalOrder::ReversePreOrder => {
                collect_pre_order(root, &mut entries);
            }
            TraversalOrder::InOrder | TraversalOrder::ReverseInOrder => {
                collect_in_order(root, &mut entries);
            }
            TraversalOrder::PostOrder | TraversalOrder::ReversePostOrder => {
                collect_post_order(root, &mut entries);
            }
            TraversalOrder::LevelOrder | TraversalOrder::ReverseLevelOrder => {
                collect_level_order(root, &mut entries);
            }
        }
    }
    if order.is_reverse() {
        entries.reverse();
    }
    Traversal {
        entries,
        current_index: 0,
    }
}

fn collect_pre_order<'a, N: BinaryNode>(node: &'a N, entries: &mut Vec<(&'a N::Key, &'a N::Value)>) {
    entries.push((node.key(), node.value()));
    if let Some(left) = node.left() {
        collect_pre_order(left, entries);
    }
    if let Some(right) = node.right() {
        collect_pre_order(right, entries);
    }
}

fn collect_in_order<'a, N: BinaryNode>(node: &'a N, entries: &mut Vec<(&'a N::Key, &'a N::Value)>) {
    if let Some(left) = node.left() {
        collect_in_order(left, entries);
    }
    entries.push((node.key(), node.value()));
    if let Some(right) = node.right() {
        collect_in_order(right, entries);
    }
}

fn collect_post_order<'a, N: BinaryNode>(
    node: &'a N,
    entries: &mut Vec<(&'a N::Key, &'a N::Value)>,
) {
    if let Some(left) = node.left() {
        collect_post_order(left, entries);
    }
    if let Some(right) = node.right() {
        collect_post_order(right, entries);
    }
    entries.push((node.key(), node.value()));
}

fn collect_level_order<'a, N: BinaryNode>(
    root: &'a N,
    entries: &mut Vec<(&'a N::Key, &'a N::Value)>,
) {
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        entries.push((node.key(), node.value()));
        queue.extend(node.left());
        queue.extend(node.right());
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Snapshot iterator returned by [`traverse`] and by the maps' `iter`.
pub struct Traversal<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    current_index: usize,
}

impl<'a, K, V> Iterator for Traversal<'a, K, V> {
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

impl<K, V> ExactSizeIterator for Traversal<'_, K, V> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

impl<K, V> std::iter::FusedIterator for Traversal<'_, K, V> {}

impl<K, V> Clone for Traversal<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            current_index: self.current_index,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
