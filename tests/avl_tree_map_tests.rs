#![cfg(feature = "avl")]
//! Unit tests for `AvlTreeMap`.

use balanced_forest::tree::{AvlTreeMap, BinaryNode, BinaryTree, TraversalOrder};
use rstest::{fixture, rstest};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const MIXED_KEYS: [i32; 7] = [6, 8, 7, 4, 5, 9, 3];

#[fixture]
fn mixed_map() -> AvlTreeMap<i32, String> {
    MIXED_KEYS
        .into_iter()
        .map(|key| (key, format!("v{key}")))
        .collect()
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: AvlTreeMap<i32, String> = AvlTreeMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.height(), 0);
    assert!(map.root().is_none());
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: AvlTreeMap<i32, String> = AvlTreeMap::default();
    assert!(map.is_empty());
    assert_eq!(map.verify(), Ok(()));
}

// =============================================================================
// Empty Tree Queries
// =============================================================================

#[rstest]
fn test_queries_on_empty_tree_are_absent() {
    let mut map: AvlTreeMap<i32, String> = AvlTreeMap::new();
    assert_eq!(map.min(), None);
    assert_eq!(map.max(), None);
    assert_eq!(map.get(&42), None);
    assert!(!map.contains_key(&42));
    assert_eq!(map.remove(&42), None);
    assert_eq!(map.remove_min(), None);
    assert_eq!(map.remove_max(), None);
    assert_eq!(map.iter().count(), 0);
    assert!(map.is_empty());
}

// =============================================================================
// Insert and Get Tests
// =============================================================================

#[rstest]
fn test_balance_holds_after_each_mixed_insert() {
    let mut map = AvlTreeMap::new();
    for key in MIXED_KEYS {
        map.insert(key, key);
        assert_eq!(map.verify(), Ok(()), "after inserting {key}");
    }
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![3, 4, 5, 6, 7, 8, 9]);
}

#[rstest]
fn test_mixed_inserts_produce_expected_shape(mixed_map: AvlTreeMap<i32, String>) {
    let pre_order: Vec<i32> = mixed_map
        .traverse(TraversalOrder::PreOrder)
        .map(|(key, _)| *key)
        .collect();
    assert_eq!(pre_order, vec![7, 5, 4, 3, 6, 8, 9]);
    assert_eq!(mixed_map.height(), 4);
    assert_eq!(mixed_map.root().map(BinaryNode::key), Some(&7));
}

#[rstest]
fn test_insert_existing_key_overwrites_value() {
    let mut map = AvlTreeMap::new();
    assert_eq!(map.put(9, Some("Marcelo")), None);
    assert_eq!(map.put(9, Some("Matilda")), Some("Marcelo"));
    assert_eq!(map.get(&9), Some(&"Matilda"));
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_put_none_removes_key(mut mixed_map: AvlTreeMap<i32, String>) {
    assert_eq!(mixed_map.put(3, None), Some("v3".to_string()));
    assert!(!mixed_map.contains_key(&3));
    assert_eq!(mixed_map.len(), 6);
    assert_eq!(mixed_map.put(3, None), None);
    assert_eq!(mixed_map.len(), 6);
    assert_eq!(mixed_map.verify(), Ok(()));
}

#[rstest]
fn test_get_with_borrowed_key() {
    let mut map = AvlTreeMap::new();
    map.insert("alpha".to_string(), 1);
    map.insert("beta".to_string(), 2);
    assert_eq!(map.get("beta"), Some(&2));
    assert!(map.contains_key("alpha"));
    assert!(!map.contains_key("gamma"));
}

#[rstest]
fn test_get_mut_updates_in_place(mut mixed_map: AvlTreeMap<i32, String>) {
    if let Some(value) = mixed_map.get_mut(&5) {
        value.push('!');
    }
    assert_eq!(mixed_map.get(&5), Some(&"v5!".to_string()));
    assert_eq!(mixed_map.get_mut(&10), None);
}

#[rstest]
#[case(1_000)]
#[case(4_095)]
fn test_ascending_inserts_stay_logarithmic(#[case] size: i32) {
    let map: AvlTreeMap<i32, i32> = (0..size).map(|key| (key, key)).collect();
    assert_eq!(map.verify(), Ok(()));
    let bound = 1.45 * f64::from(size + 2).log2();
    assert!((map.height() as f64) < bound);
}

// =============================================================================
// Remove Tests
// =============================================================================

#[rstest]
fn test_remove_returns_value_and_keeps_balance(mut mixed_map: AvlTreeMap<i32, String>) {
    assert_eq!(mixed_map.remove(&7), Some("v7".to_string()));
    assert_eq!(mixed_map.verify(), Ok(()));
    assert!(!mixed_map.contains_key(&7));
    assert_eq!(mixed_map.get(&7), None);
    assert_eq!(mixed_map.len(), 6);
}

fn pre_order_keys<V>(map: &AvlTreeMap<i32, V>) -> Vec<i32> {
    map.traverse(TraversalOrder::PreOrder)
        .map(|(key, _)| *key)
        .collect()
}

#[rstest]
#[case::below_min(0)]
#[case::far_below_min(i32::MIN)]
#[case::above_max(100)]
fn test_remove_absent_key_is_noop(mut mixed_map: AvlTreeMap<i32, String>, #[case] key: i32) {
    let before = mixed_map.clone();
    assert_eq!(mixed_map.remove(&key), None);
    assert_eq!(mixed_map, before);
    assert_eq!(pre_order_keys(&mixed_map), pre_order_keys(&before));
    assert_eq!(mixed_map.height(), before.height());
    assert_eq!(mixed_map.to_string(), before.to_string());
}

#[rstest]
fn test_remove_everything_in_mixed_order() {
    let mut map: AvlTreeMap<i32, i32> = (0..200).map(|key| (key, key)).collect();
    for key in (0..200).filter(|key| key % 2 == 0).chain((0..200).filter(|key| key % 2 == 1)) {
        assert_eq!(map.remove(&key), Some(key));
        assert_eq!(map.verify(), Ok(()));
    }
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
}

#[rstest]
fn test_remove_min_and_max(mut mixed_map: AvlTreeMap<i32, String>) {
    assert_eq!(mixed_map.remove_min(), Some((3, "v3".to_string())));
    assert_eq!(mixed_map.remove_max(), Some((9, "v9".to_string())));
    assert_eq!(mixed_map.min(), Some((&4, &"v4".to_string())));
    assert_eq!(mixed_map.max(), Some((&8, &"v8".to_string())));
    assert_eq!(mixed_map.len(), 5);
}

#[rstest]
fn test_clear_empties_map(mut mixed_map: AvlTreeMap<i32, String>) {
    mixed_map.clear();
    assert!(mixed_map.is_empty());
    assert_eq!(mixed_map.min(), None);
    assert_eq!(mixed_map.verify(), Ok(()));
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[rstest]
fn test_iter_is_ascending(mixed_map: AvlTreeMap<i32, String>) {
    let entries: Vec<(i32, String)> = mixed_map
        .iter()
        .map(|(key, value)| (*key, value.clone()))
        .collect();
    let expected: Vec<(i32, String)> = (3..=9).map(|key| (key, format!("v{key}"))).collect();
    assert_eq!(entries, expected);
}

#[rstest]
fn test_values_follow_key_order(mixed_map: AvlTreeMap<i32, String>) {
    let values: Vec<&str> = mixed_map.values().map(String::as_str).collect();
    assert_eq!(values, vec!["v3", "v4", "v5", "v6", "v7", "v8", "v9"]);
}

#[rstest]
fn test_into_iter_is_ascending_and_double_ended(mixed_map: AvlTreeMap<i32, String>) {
    let mut iter = mixed_map.into_iter();
    assert_eq!(iter.len(), 7);
    assert_eq!(iter.next(), Some((3, "v3".to_string())));
    assert_eq!(iter.next_back(), Some((9, "v9".to_string())));
    let rest: Vec<i32> = iter.map(|(key, _)| key).collect();
    assert_eq!(rest, vec![4, 5, 6, 7, 8]);
}

#[rstest]
fn test_for_loop_over_reference(mixed_map: AvlTreeMap<i32, String>) {
    let mut sum = 0;
    for (key, _) in &mixed_map {
        sum += key;
    }
    assert_eq!(sum, 42);
}

#[rstest]
fn test_iterator_is_a_snapshot(mixed_map: AvlTreeMap<i32, String>) {
    let first = mixed_map.iter();
    let second = first.clone();
    assert_eq!(first.count(), 7);
    assert_eq!(second.count(), 7);
}

// =============================================================================
// Standard Trait Tests
// =============================================================================

#[rstest]
fn test_equality_ignores_insertion_order() {
    let ascending: AvlTreeMap<i32, i32> = (0..50).map(|key| (key, key)).collect();
    let descending: AvlTreeMap<i32, i32> = (0..50).rev().map(|key| (key, key)).collect();
    assert_eq!(ascending, descending);
    assert_eq!(hash_of(&ascending), hash_of(&descending));
}

#[rstest]
fn test_extend_overwrites_existing_keys(mut mixed_map: AvlTreeMap<i32, String>) {
    mixed_map.extend([(3, "three".to_string()), (10, "ten".to_string())]);
    assert_eq!(mixed_map.len(), 8);
    assert_eq!(mixed_map.get(&3), Some(&"three".to_string()));
    assert_eq!(mixed_map.get(&10), Some(&"ten".to_string()));
}

#[rstest]
fn test_debug_format(mixed_map: AvlTreeMap<i32, String>) {
    let small: AvlTreeMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    assert_eq!(format!("{small:?}"), r#"{1: "a", 2: "b"}"#);
    assert!(format!("{mixed_map:?}").starts_with(r#"{3: "v3""#));
}

#[rstest]
fn test_clone_is_independent(mixed_map: AvlTreeMap<i32, String>) {
    let mut copy = mixed_map.clone();
    copy.insert(100, "v100".to_string());
    assert_eq!(mixed_map.len(), 7);
    assert_eq!(copy.len(), 8);
    assert!(!mixed_map.contains_key(&100));
}
