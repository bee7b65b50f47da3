// Invariants of the shipped icon catalog and default configuration.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use scratch_ticket::config::MIN_CATALOG_SIZE;
use scratch_ticket::ticket::IconCatalog;
use scratch_ticket::{EngineConfig, ICON_CATALOG, ScratchError};

#[test]
fn icon_catalog_entries_are_unique_and_valid() {
    let mut seen = HashSet::new();
    for name in ICON_CATALOG {
        assert!(seen.insert(*name), "duplicate icon '{}' in ICON_CATALOG", name);
        assert!(!name.is_empty(), "empty icon name");
        for c in name.chars() {
            assert!(c.is_ascii_uppercase(), "invalid char '{}' in icon '{}'", c, name);
        }
    }
}

#[test]
fn icon_catalog_is_large_enough_for_pair_decks() {
    assert!(ICON_CATALOG.len() >= MIN_CATALOG_SIZE);
    let names = ICON_CATALOG.iter().map(|s| s.to_string()).collect();
    let catalog = IconCatalog::new(names).unwrap();
    assert_eq!(catalog.len(), ICON_CATALOG.len());
    assert_eq!(catalog.name(catalog.ids().last().unwrap()), "SPINE");
}

#[test]
fn default_config_uses_icon_catalog() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.icons, ICON_CATALOG.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    cfg.validate().unwrap();
}

#[test]
fn json_override_with_small_catalog_fails_validation() {
    let cfg = EngineConfig::from_json(r#"{"icons": ["A", "B", "C"]}"#).unwrap();
    assert!(matches!(
        cfg.validate(),
        Err(ScratchError::CatalogTooSmall { min: 6, have: 3 })
    ));
}
