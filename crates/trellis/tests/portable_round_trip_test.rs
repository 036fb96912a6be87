//! Whole-store serialization: lossless round trips and tolerant bulk
//! loading of partially broken documents.

use trellis::component::ComponentKind;
use trellis::factory::{self, ComponentInit};
use trellis::ComponentStore;

fn populated_store() -> ComponentStore {
    let mut store = ComponentStore::new();
    store
        .create_and_add(ComponentKind::StartEnd, ComponentInit::in_context("step-1"))
        .unwrap();
    let process_id = store
        .create_and_add(ComponentKind::Process, ComponentInit::in_context("step-1"))
        .unwrap()
        .id()
        .to_string();
    let decision_id = store
        .create_and_add(ComponentKind::Decision, ComponentInit::in_context("step-2"))
        .unwrap()
        .id()
        .to_string();

    let mut connector = factory::connector(&process_id, &decision_id);
    connector.add_to_context("step-1");
    connector.set_label("next", 0.3).unwrap();
    store.add(connector).unwrap();
    store
}

#[test]
fn portable_form_round_trips_the_whole_store() {
    let store = populated_store();
    let records = store.to_portable();

    let mut restored = ComponentStore::new();
    let report = restored.from_portable(&records);

    assert_eq!(report.loaded, 4);
    assert!(report.skipped.is_empty());
    assert_eq!(restored.stats(), store.stats());
    for original in store.components() {
        let loaded = restored.get(original.id()).unwrap();
        assert_eq!(loaded, original);
    }
}

#[test]
fn text_round_trip_is_lossless() {
    let store = populated_store();
    let text = store.export_text().unwrap();

    let mut restored = ComponentStore::new();
    let report = restored.import_text(&text).unwrap();

    assert_eq!(report.loaded, store.len());
    assert!(report.skipped.is_empty());
    assert_eq!(restored.export_text().unwrap(), text);
}

#[test]
fn one_malformed_record_out_of_three_is_skipped_not_fatal() {
    let mut store = ComponentStore::new();
    store
        .create_and_add(ComponentKind::Process, ComponentInit::default())
        .unwrap();
    store
        .create_and_add(ComponentKind::Data, ComponentInit::default())
        .unwrap();

    let mut records = store.to_portable();
    records[1].kind = "widget".to_string();
    records.push(store.to_portable()[1].clone());

    let mut restored = ComponentStore::new();
    let report = restored.from_portable(&records);

    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("unknown component kind"));
    assert_eq!(restored.len(), 2);
}

#[test]
fn malformed_outer_document_is_an_error() {
    let mut store = populated_store();
    let before = store.len();

    assert!(store.import_text("{ not json ").is_err());
    // The failed import never got to clearing the store.
    assert_eq!(store.len(), before);
}

#[test]
fn records_with_bad_timestamps_are_reported_by_id() {
    let store = populated_store();
    let mut records = store.to_portable();
    let broken_id = records[0].id.clone();
    records[0].created_at = "not-a-date".to_string();

    let mut restored = ComponentStore::new();
    let report = restored.from_portable(&records);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id.as_deref(), Some(broken_id.as_str()));
    assert_eq!(restored.len(), store.len() - 1);
}
