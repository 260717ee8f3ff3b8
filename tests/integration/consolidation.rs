//! Integration tests for store consolidation.
//!
//! Stores are built from YAML text so each case reads like the store file a
//! contributor would edit.

use uam::error::ModelsError;
use uam::models::sorter::{compare_keys, sort_keys, sort_tree};
use uam::models::{
    AddMode, DeviceRecord, DeviceStore, Directive, Resolution, SlotKey, apply_directives,
    consolidate, resolve_slot,
};
use uam::persist::{StoreFormat, parse_store, render_store};

fn store(yaml: &str) -> DeviceStore {
    parse_store(yaml, StoreFormat::Yaml).expect("valid store")
}

fn record(yaml: &str) -> DeviceRecord {
    serde_yaml::from_str(yaml).expect("valid record")
}

// ===== Resolution =====

#[test]
fn canonical_record_resolves_to_itself() {
    let mut s = store("device_models:\n  A:\n    x: {size: 5, name: Foo}\n");
    let key = SlotKey::new("A", "x");

    assert_eq!(resolve_slot(&mut s, &key).unwrap(), Resolution::Resolved);
    assert_eq!(
        s.get(&key),
        Some(&record("{brand: A, model: x, size: 5, name: Foo}"))
    );
}

#[test]
fn alias_resolves_to_canonical_attributes() {
    let mut s = store(
        "device_models:
  A:
    x: {brand: B, model: y}
  B:
    y: {brand: B, model: y, size: 5.0, name: Foo}
",
    );
    resolve_slot(&mut s, &SlotKey::new("A", "x")).unwrap();
    assert_eq!(
        s.get_slot("A", "x"),
        Some(&record("{brand: B, model: y, size: 5.0, name: Foo}"))
    );
}

#[test]
fn four_hop_chain_resolves() {
    let mut s = store(
        "device_models:
  A: {a: {brand: B, model: b}}
  B: {b: {brand: C, model: c}}
  C: {c: {brand: D, model: d}}
  D: {d: {brand: E, model: e}}
  E: {e: {brand: E, model: e, size: 7}}
",
    );
    assert_eq!(
        resolve_slot(&mut s, &SlotKey::new("A", "a")).unwrap(),
        Resolution::Resolved
    );
    assert_eq!(
        s.get_slot("A", "a"),
        Some(&record("{brand: E, model: e, size: 7}"))
    );

    let report = consolidate(&mut s).unwrap();
    assert_eq!(report.dangling, 0);
    assert_eq!(s.get_slot("A", "a"), Some(&DeviceRecord::alias("E", "e")));
    assert_eq!(s.get_slot("E", "e"), Some(&record("{size: 7}")));
}

#[test]
fn cycle_error_names_starting_slot() {
    let mut s = store(
        "device_models:
  A: {x: {brand: B, model: y}}
  B: {y: {brand: C, model: z}}
  C: {z: {brand: A, model: x}}
",
    );
    let err = resolve_slot(&mut s, &SlotKey::new("B", "y")).unwrap_err();
    match err {
        ModelsError::Recursion { brand, model } => {
            assert_eq!((brand.as_str(), model.as_str()), ("B", "y"));
        }
        other => panic!("expected recursion error, got {other:?}"),
    }
}

#[test]
fn dangling_pointer_is_left_alone() {
    let mut s = store("device_models:\n  A:\n    x: {brand: Nowhere, model: y, size: 3}\n");
    let key = SlotKey::new("A", "x");

    assert_eq!(resolve_slot(&mut s, &key).unwrap(), Resolution::Dangling);
    assert_eq!(
        s.get(&key),
        Some(&record("{brand: Nowhere, model: y, size: 3}"))
    );
}

#[test]
fn dangling_pointer_is_counted_and_kept_as_alias() {
    let mut s = store("device_models:\n  A:\n    x: {brand: Nowhere, model: y, size: 3}\n");
    let report = consolidate(&mut s).unwrap();

    assert_eq!(report.dangling, 1);
    assert_eq!(
        s.get_slot("A", "x"),
        Some(&DeviceRecord::alias("Nowhere", "y"))
    );
}

// ===== Case folding =====

#[test]
fn first_spelling_wins() {
    let mut s = DeviceStore::new();
    s.add("iPhone", "6", DeviceRecord::new(), AddMode::Merge);
    s.add("IPHONE", "6", record("{size: 4.7}"), AddMode::Merge);

    assert_eq!(s.brand_count(), 1);
    assert_eq!(s.model_count(), 1);
    assert_eq!(s.get_slot("iPhone", "6"), Some(&record("{size: 4.7}")));
}

// ===== Name dedup =====

#[test]
fn consistent_names_collapse_to_one_record() {
    let mut s = store(
        "device_models:
  A: {x: {name: Foo, size: 5}}
  B: {y: {name: Foo, size: 5}}
",
    );
    let report = consolidate(&mut s).unwrap();

    assert_eq!(report.dedup.aliased, 1);
    assert!(report.dedup.diagnostics.is_empty());
    assert_eq!(s.get_slot("A", "x"), Some(&record("{name: Foo, size: 5}")));
    assert_eq!(s.get_slot("B", "y"), Some(&DeviceRecord::alias("A", "x")));
}

#[test]
fn inconsistent_names_keep_their_data() {
    let mut s = store(
        "device_models:
  A: {x: {name: Foo, size: 5}}
  B: {y: {name: Foo, size: 6}}
",
    );
    let report = consolidate(&mut s).unwrap();

    assert_eq!(report.dedup.aliased, 0);
    assert_eq!(report.dedup.diagnostics.len(), 1);
    let diag = &report.dedup.diagnostics[0];
    assert_eq!((diag.brand.as_str(), diag.model.as_str()), ("B", "y"));
    assert_eq!(diag.mismatches[0].field, "size");

    assert_eq!(s.get_slot("A", "x").unwrap().size, Some(5.0));
    assert_eq!(s.get_slot("B", "y").unwrap().size, Some(6.0));
}

#[test]
fn same_model_under_other_brand_keeps_brand_pointer_only() {
    let mut s = store(
        "device_models:
  Alcatel: {OT-4030: {name: Pop, size: 4}}
  Vodafone: {OT-4030: {name: Pop, size: 4}}
",
    );
    consolidate(&mut s).unwrap();

    assert_eq!(
        s.get_slot("Vodafone", "OT-4030"),
        Some(&DeviceRecord {
            brand: Some("Alcatel".to_string()),
            ..DeviceRecord::default()
        })
    );
}

#[test]
fn consolidation_is_idempotent() {
    let mut s = store(
        "device_models:
  A: {x: {name: Foo, size: 5}, z: {brand: A, model: x}}
  B: {y: {name: Foo, size: 5}}
",
    );
    consolidate(&mut s).unwrap();
    let first = render_store(&s, StoreFormat::Yaml).unwrap();
    consolidate(&mut s).unwrap();
    let second = render_store(&s, StoreFormat::Yaml).unwrap();

    assert_eq!(first, second);
}

// ===== Ordering =====

#[test]
fn lowercase_sorts_before_uppercase() {
    let mut keys = vec!["ab", "AA", "aa"];
    sort_keys(&mut keys);
    assert_eq!(keys, vec!["aa", "AA", "ab"]);
    assert!(compare_keys("Galaxy S", "galaxy s2").is_lt());
}

#[test]
fn sorting_twice_is_identical() {
    let tree: serde_yaml::Value =
        serde_yaml::from_str("{b: {z: 1, A: 2}, a: [ {y: 1, x: 2} ], B: 3}").unwrap();
    let once = sort_tree(tree);
    let twice = sort_tree(once.clone());
    assert_eq!(
        serde_yaml::to_string(&once).unwrap(),
        serde_yaml::to_string(&twice).unwrap()
    );
}

#[test]
fn saved_store_lists_keys_in_sorter_order() {
    let s = store(
        "device_models:
  zte: {b: {}}
  Apple: {iPhone: {}, ipad: {}}
",
    );
    let text = render_store(&s, StoreFormat::Yaml).unwrap();
    let apple = text.find("Apple:").unwrap();
    let ipad = text.find("ipad:").unwrap();
    let iphone = text.find("iPhone:").unwrap();
    let zte = text.find("zte:").unwrap();
    assert!(apple < ipad && ipad < iphone && iphone < zte, "{text}");
}

// ===== Commands =====

#[test]
fn move_reparents_and_keeps_attributes() {
    let mut s = store("device_models:\n  A:\n    x: {size: 5}\n");
    apply_directives(
        &mut s,
        &[Directive::Move {
            brand: "B".to_string(),
        }],
        record("{brand: A, model: x, type: tablet}"),
    );

    assert!(s.get_slot("A", "x").is_none());
    let moved = s.get_slot("B", "x").unwrap();
    assert_eq!(moved.size, Some(5.0));
    assert_eq!(moved.device_type.as_deref(), Some("tablet"));
}

#[test]
fn move_then_consolidate_leaves_canonical_slot() {
    let mut s = store("device_models:\n  A:\n    x: {size: 5}\n");
    apply_directives(
        &mut s,
        &[Directive::Move {
            brand: "B".to_string(),
        }],
        record("{brand: A, model: x}"),
    );
    consolidate(&mut s).unwrap();

    assert_eq!(s.get_slot("B", "x"), Some(&record("{size: 5}")));
}

#[test]
fn delete_of_missing_slot_is_a_no_op() {
    let mut s = store("device_models:\n  A:\n    x: {size: 5}\n");
    apply_directives(&mut s, &[Directive::Delete], record("{brand: A, model: nope}"));
    assert_eq!(s.model_count(), 1);
}

#[test]
fn mixed_case_move_keeps_data_through_consolidation() {
    let mut s = store("device_models:\n  Acme:\n    X1: {size: 5, name: Foo}\n");
    apply_directives(
        &mut s,
        &[Directive::Move {
            brand: "Other".to_string(),
        }],
        record("{brand: acme, model: x1}"),
    );
    let report = consolidate(&mut s).unwrap();

    assert_eq!(report.dangling, 0);
    assert!(s.models("Acme").is_none());
    assert_eq!(s.get_slot("Other", "X1"), Some(&record("{size: 5, name: Foo}")));
}

#[test]
fn mixed_case_set_points_at_existing_slot() {
    let mut s = store(
        "device_models:
  A:
    X1: {name: Foo}
  B:
    X1: {size: 5}
",
    );
    apply_directives(
        &mut s,
        &[Directive::Set {
            brand: "b".to_string(),
        }],
        record("{brand: a, model: x1}"),
    );
    let report = consolidate(&mut s).unwrap();

    assert_eq!(report.dangling, 0);
    assert_eq!(s.get_slot("A", "X1"), Some(&record("{brand: B}")));
    assert_eq!(s.get_slot("B", "X1"), Some(&record("{size: 5}")));
}

#[test]
fn mixed_case_replace_and_delete_address_stored_slot() {
    let mut s = store("device_models:\n  Acme:\n    X1: {size: 5}\n    Y2: {size: 6}\n");
    apply_directives(
        &mut s,
        &[Directive::Replace],
        record("{brand: ACME, model: x1, name: Bar}"),
    );
    apply_directives(&mut s, &[Directive::Delete], record("{brand: acme, model: y2}"));
    consolidate(&mut s).unwrap();

    assert_eq!(s.model_count(), 1);
    assert_eq!(s.get_slot("Acme", "X1"), Some(&record("{name: Bar}")));
}

