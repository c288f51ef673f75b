//! Integration tests for the persistent key-value store.

use pharmacare::models::{IdGenerator, Pharmacy};
use pharmacare::store::{keys, Store};
use proptest::prelude::*;
use tempfile::tempdir;

fn sample_pharmacy(name: &str) -> Pharmacy {
    Pharmacy {
        id: IdGenerator::next("ph"),
        name: name.to_string(),
        address: "12 Beacon St, Boston, MA".to_string(),
        phone: "(617) 555-0101".to_string(),
        email: "info@greenleaf.test".to_string(),
        license: "LIC-100".to_string(),
        created_at: chrono::Local::now(),
    }
}

#[test]
fn round_trip_preserves_collection_values() {
    let dir = tempdir().expect("temp dir");
    let store = Store::open(dir.path()).expect("open store");

    let pharmacies = vec![sample_pharmacy("Greenleaf Pharmacy"), sample_pharmacy("Harbor Rx")];
    store.put(keys::PHARMACIES, &pharmacies).expect("put");

    let loaded: Vec<Pharmacy> = store.get(keys::PHARMACIES).expect("slot present");
    assert_eq!(loaded, pharmacies);
}

#[test]
fn absent_slot_yields_callers_default() {
    let dir = tempdir().expect("temp dir");
    let store = Store::open(dir.path()).expect("open store");

    let loaded: Vec<Pharmacy> = store.get_or(keys::PHARMACIES, Vec::new());
    assert!(loaded.is_empty());
}

#[test]
fn corrupt_slot_is_swallowed_not_propagated() {
    let dir = tempdir().expect("temp dir");
    let store = Store::open(dir.path()).expect("open store");

    // Valid JSON, wrong shape for the collection.
    store
        .put(keys::PHARMACIES, &"not a pharmacy list")
        .expect("put");

    let loaded: Vec<Pharmacy> = store.get_or(keys::PHARMACIES, Vec::new());
    assert!(loaded.is_empty());
}

#[test]
fn remove_clears_the_slot() {
    let dir = tempdir().expect("temp dir");
    let store = Store::open(dir.path()).expect("open store");

    store
        .put(keys::PHARMACIES, &vec![sample_pharmacy("Greenleaf Pharmacy")])
        .expect("put");
    store.remove(keys::PHARMACIES).expect("remove");

    assert!(store.get::<Vec<Pharmacy>>(keys::PHARMACIES).is_none());
}

#[test]
fn dump_lists_only_present_known_slots() {
    let dir = tempdir().expect("temp dir");
    let store = Store::open(dir.path()).expect("open store");

    store
        .put(keys::PHARMACIES, &vec![sample_pharmacy("Greenleaf Pharmacy")])
        .expect("put");

    let dump = store.dump();
    assert_eq!(dump.len(), 1);
    assert_eq!(dump[0].0, keys::PHARMACIES);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn round_trip_holds_for_arbitrary_string_collections(
        values in proptest::collection::vec(".*", 0..8)
    ) {
        let dir = tempdir().expect("temp dir");
        let store = Store::open(dir.path()).expect("open store");

        store.put(keys::CUSTOMERS, &values).expect("put");
        let loaded: Vec<String> = store.get_or(keys::CUSTOMERS, Vec::new());
        prop_assert_eq!(loaded, values);
    }
}
