#![cfg(all(feature = "serde", feature = "avl", feature = "red-black"))]

//! Integration tests for serde support.
//!
//! Both maps serialize as a plain map in ascending key order and rebuild a
//! balanced tree when deserialized.

use balanced_forest::tree::{AvlTreeMap, RedBlackTreeMap};
use rstest::rstest;

// =============================================================================
// AvlTreeMap Integration Tests
// =============================================================================

#[rstest]
fn test_avl_serializes_in_key_order() {
    let map: AvlTreeMap<String, i32> = [("b", 2), ("c", 3), ("a", 1)]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"a":1,"b":2,"c":3}"#);
}

#[rstest]
fn test_avl_json_roundtrip() {
    let map: AvlTreeMap<i32, String> = (0..64).map(|key| (key, format!("v{key}"))).collect();
    let json = serde_json::to_string(&map).unwrap();
    let restored: AvlTreeMap<i32, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
    assert_eq!(restored.verify(), Ok(()));
}

#[rstest]
fn test_avl_deserialize_duplicate_keys_keeps_last() {
    let restored: AvlTreeMap<String, i32> = serde_json::from_str(r#"{"x":1,"x":2}"#).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.get("x"), Some(&2));
}

// =============================================================================
// RedBlackTreeMap Integration Tests
// =============================================================================

#[rstest]
fn test_red_black_json_roundtrip() {
    let map: RedBlackTreeMap<String, Vec<u8>> = (0u8..32)
        .map(|index| (format!("key{index:02}"), vec![index; usize::from(index % 4)]))
        .collect();
    let json = serde_json::to_string(&map).unwrap();
    let restored: RedBlackTreeMap<String, Vec<u8>> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
    assert_eq!(restored.verify(), Ok(()));
    assert_eq!(restored.select(10).map(|(key, _)| key.as_str()), Some("key10"));
}

#[rstest]
fn test_red_black_empty_roundtrip() {
    let map: RedBlackTreeMap<String, i32> = RedBlackTreeMap::new();
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, "{}");
    let restored: RedBlackTreeMap<String, i32> = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
}

#[rstest]
fn test_red_black_rejects_non_map() {
    let result: Result<RedBlackTreeMap<String, i32>, _> = serde_json::from_str("[1, 2, 3]");
    assert!(result.is_err());
}
