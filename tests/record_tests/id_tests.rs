//! Tests for IdGenerator and ID prefixes

use std::collections::HashSet;

use gridstore::record::IdGenerator;
use gridstore::Config;

#[test]
fn test_id_has_prefix_and_suffix_length() {
    let ids = IdGenerator::default();

    let id = ids.new_id("CUS_");

    assert!(id.starts_with("CUS_"));
    assert_eq!(id.len(), 4 + 12);
    assert!(id["CUS_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_custom_suffix_length() {
    let ids = IdGenerator::new(5);

    assert_eq!(ids.suffix_len(), 5);
    assert_eq!(ids.new_id("").len(), 5);
}

#[test]
fn test_ids_are_distinct() {
    let ids = IdGenerator::default();

    let generated: HashSet<String> = (0..10_000).map(|_| ids.new_id("X_")).collect();

    assert_eq!(generated.len(), 10_000);
}

#[test]
fn test_default_prefix_from_collection_name() {
    let config = Config::default();

    assert_eq!(config.id_prefix_for("Customers"), "CUS_");
    assert_eq!(config.id_prefix_for("order items"), "ORD_");
    assert_eq!(config.id_prefix_for("a-b"), "AB_");
    assert_eq!(config.id_prefix_for("__"), "ROW_");
}

#[test]
fn test_configured_prefix_overrides_default() {
    let config = Config::builder().id_prefix("Customers", "C-").build();

    assert_eq!(config.id_prefix_for("Customers"), "C-");
    assert_eq!(config.id_prefix_for("Orders"), "ORD_");
}
