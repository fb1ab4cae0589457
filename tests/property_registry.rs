//! Property-based tests for registry invariants
//!
//! Tests the following properties:
//! 1. Defaults round-trip: a value set with set_config decodes back unchanged
//! 2. Loaded data wins: defaults never replace loaded values, in either order
//! 3. Root identity: root() after any navigation sees the top-level settings
//! 4. Duration strings: whole-unit strings decode to the matching Duration

use configer::{LocalRegistry, ReadOption, Registry};
use proptest::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

mod common;

/// Generate config keys (no dots, so each is a single level)
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Generate a top-level map whose values nest up to three levels deep
fn tree_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        any::<i32>().prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
        "[a-z ]{0,12}".prop_map(serde_json::Value::from),
    ];
    let node = leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 1..4)
            .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
    });
    prop::collection::btree_map(key_strategy(), node, 1..4)
        .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
}

fn load_json(value: &serde_json::Value) -> LocalRegistry {
    let mut registry = LocalRegistry::new();
    registry.set_config_type("json");
    registry
        .read_config(vec![ReadOption::Bytes(value.to_string().into_bytes())])
        .expect("Generated JSON should load");
    registry
}

/// Every key path that leads to a map, in navigation order
fn map_paths(value: &serde_json::Value, prefix: &[String], out: &mut Vec<Vec<String>>) {
    if let serde_json::Value::Object(map) = value {
        for (key, child) in map {
            if child.is_object() {
                let mut path = prefix.to_vec();
                path.push(key.clone());
                out.push(path.clone());
                map_paths(child, &path, out);
            }
        }
    }
}

proptest! {
    /// Property 1: a default reads back exactly as it was set
    #[test]
    fn proptest_default_round_trip(
        key in key_strategy(),
        values in prop::collection::vec(any::<i64>(), 0..8),
        label in "[a-zA-Z0-9_-]{1,16}",
    ) {
        #[derive(Debug, Deserialize)]
        struct Section {
            values: Vec<i64>,
            label: String,
        }

        let registry = LocalRegistry::new();
        registry.set_config(&format!("{key}.values"), &values);
        registry.set_config(&format!("{key}.label"), &label);

        let section: Section = registry
            .value_of(&key)
            .expect("Defaults create a subtree")
            .unmarshal(&[])
            .expect("Defaults should decode");
        prop_assert_eq!(section.values, values);
        prop_assert_eq!(section.label, label);
    }

    /// Property 2: loaded data wins whether the default comes first or last
    #[test]
    fn proptest_loaded_value_wins(
        key in key_strategy(),
        loaded in any::<i32>(),
        default in any::<i32>(),
        default_first in any::<bool>(),
    ) {
        let source = serde_json::json!({ key.clone(): loaded });
        let mut registry = LocalRegistry::new();
        registry.set_config_type("json");
        if default_first {
            registry.set_config(&key, default);
        }
        registry
            .read_config(vec![ReadOption::Bytes(source.to_string().into_bytes())])
            .expect("JSON should load");
        if !default_first {
            registry.set_config(&key, default);
        }

        prop_assert_eq!(registry.get::<i32>(&key).unwrap(), Some(loaded));
    }

    /// Property 3: root() after any navigation equals the top-level view
    #[test]
    fn proptest_root_after_navigation(tree in tree_strategy(), pick in any::<prop::sample::Index>()) {
        let registry = load_json(&tree);
        let expected = registry.all_settings().unwrap();

        let mut paths = Vec::new();
        map_paths(&tree, &[], &mut paths);
        prop_assume!(!paths.is_empty());
        let path = pick.get(&paths);

        let mut view = registry.clone();
        for key in path {
            view = view.value_of(key).expect("Path was generated from maps");
        }

        prop_assert_eq!(view.root().all_settings().unwrap(), expected.clone());
        prop_assert_eq!(view.root().root().all_settings().unwrap(), expected);
    }

    /// Property 4: whole-unit duration strings decode exactly
    #[test]
    fn proptest_duration_strings(amount in 0u64..100_000, unit in prop::sample::select(vec!["ms", "s", "m", "h"])) {
        let registry = LocalRegistry::new();
        registry.set_config("timeout", format!("{amount}{unit}"));

        let expected = match unit {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount * 60),
            _ => Duration::from_secs(amount * 3600),
        };
        prop_assert_eq!(registry.get_duration("timeout"), Some(expected));
    }
}

#[test]
fn test_common_fixture_has_nested_maps() {
    let registry = common::local_registry(common::SERVICE_YAML);
    let sections: BTreeMap<String, serde_json::Value> = registry.unmarshal(&[]).unwrap();
    assert!(sections.contains_key("service"));
    assert!(sections.contains_key("features"));
}
