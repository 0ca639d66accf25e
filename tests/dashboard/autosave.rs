use std::{collections::BTreeMap, sync::Arc};

use time::OffsetDateTime;
use tokio::time::{Duration, sleep};

use emergency_dashboard::{
    autosave::{AutoSaveRecord, FieldChange, FormField, RestoreOutcome, TrackedForm},
    notifications::NoopNotificationSource,
    storage::{LocalStorage, autosave_key},
};

use crate::support::{CountingStorage, ScriptedBackend, harness, harness_with};

const FORM_ID: &str = "scenario-form";

fn scenario_form() -> TrackedForm {
    TrackedForm::new(FORM_ID)
        .with_field(FormField::text("title", ""))
        .with_field(FormField::select("severity", "Low"))
        .with_field(FormField::checkbox("notify", "yes", false))
}

fn seed_record(storage: &CountingStorage, age: time::Duration, title: &str) {
    let record = AutoSaveRecord {
        data: BTreeMap::from([
            ("title".to_string(), title.to_string()),
            ("severity".to_string(), "High".to_string()),
            ("notify".to_string(), "yes".to_string()),
        ]),
        timestamp: OffsetDateTime::now_utc() - age,
    };
    storage
        .set_item(
            &autosave_key(FORM_ID),
            &serde_json::to_string(&record).expect("encode record"),
        )
        .expect("seed record");
}

fn written_records(storage: &CountingStorage) -> Vec<AutoSaveRecord> {
    storage
        .writes_for(&autosave_key(FORM_ID))
        .iter()
        .map(|raw| serde_json::from_str(raw).expect("record JSON"))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn rapid_changes_coalesce_into_one_write() {
    let harness = harness();
    assert_eq!(
        harness.controller.register_form(scenario_form()),
        RestoreOutcome::NotFound
    );

    for (index, title) in ["F", "Flo", "Flood"].into_iter().enumerate() {
        if index > 0 {
            sleep(Duration::from_millis(300)).await;
        }
        assert!(
            harness
                .controller
                .change_field(FORM_ID, &FieldChange::value("title", title))
        );
    }

    sleep(Duration::from_millis(999)).await;
    assert!(written_records(&harness.storage).is_empty());

    sleep(Duration::from_millis(2)).await;
    let records = written_records(&harness.storage);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data.get("title").map(String::as_str), Some("Flood"));
    assert!(!records[0].data.contains_key("notify"));
}

#[tokio::test(start_paused = true)]
async fn each_change_restarts_the_debounce_window() {
    let harness = harness();
    harness.controller.register_form(scenario_form());

    harness
        .controller
        .change_field(FORM_ID, &FieldChange::value("title", "Wildfire"));
    sleep(Duration::from_millis(900)).await;
    harness
        .controller
        .change_field(FORM_ID, &FieldChange::checked("notify", "yes", true));

    sleep(Duration::from_millis(200)).await;
    assert!(written_records(&harness.storage).is_empty());

    sleep(Duration::from_millis(801)).await;
    let records = written_records(&harness.storage);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data.get("title").map(String::as_str), Some("Wildfire"));
    assert_eq!(records[0].data.get("notify").map(String::as_str), Some("yes"));
}

#[tokio::test(start_paused = true)]
async fn fresh_record_is_restored_on_register() {
    let storage = Arc::new(CountingStorage::default());
    let harness = harness_with(
        Arc::new(ScriptedBackend::default()),
        storage.clone(),
        Arc::new(NoopNotificationSource),
    );
    seed_record(&storage, time::Duration::hours(23), "Chemical spill");

    let outcome = harness.controller.register_form(scenario_form());

    assert!(outcome.is_restored());
    let form = harness.controller.form(FORM_ID).expect("tracked form");
    assert_eq!(form.field("title").map(|field| field.value.as_str()), Some("Chemical spill"));
    assert_eq!(form.field("severity").map(|field| field.value.as_str()), Some("High"));
    assert_eq!(form.field("notify").map(|field| field.checked), Some(true));
}

#[tokio::test(start_paused = true)]
async fn stale_record_is_purged_instead_of_restored() {
    let storage = Arc::new(CountingStorage::default());
    let harness = harness_with(
        Arc::new(ScriptedBackend::default()),
        storage.clone(),
        Arc::new(NoopNotificationSource),
    );
    seed_record(&storage, time::Duration::hours(25), "Old draft");

    let outcome = harness.controller.register_form(scenario_form());

    assert!(matches!(outcome, RestoreOutcome::Expired { .. }));
    assert_eq!(storage.get_item(&autosave_key(FORM_ID)).expect("read"), None);
    let form = harness.controller.form(FORM_ID).expect("tracked form");
    assert_eq!(form.field("title").map(|field| field.value.as_str()), Some(""));
}

#[tokio::test(start_paused = true)]
async fn stale_records_are_purged_at_startup() {
    let storage = Arc::new(CountingStorage::default());
    seed_record(&storage, time::Duration::hours(30), "Abandoned");

    let _harness = harness_with(
        Arc::new(ScriptedBackend::default()),
        storage.clone(),
        Arc::new(NoopNotificationSource),
    );

    assert_eq!(storage.get_item(&autosave_key(FORM_ID)).expect("read"), None);
}

#[tokio::test(start_paused = true)]
async fn unknown_forms_and_fields_are_rejected() {
    let harness = harness();
    harness.controller.register_form(scenario_form());

    assert!(
        !harness
            .controller
            .change_field("missing-form", &FieldChange::value("title", "x"))
    );
    assert!(
        !harness
            .controller
            .change_field(FORM_ID, &FieldChange::value("missing-field", "x"))
    );

    sleep(Duration::from_millis(1_500)).await;
    assert!(written_records(&harness.storage).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unregistered_form_drops_pending_save() {
    let harness = harness();
    harness.controller.register_form(scenario_form());
    harness
        .controller
        .change_field(FORM_ID, &FieldChange::value("title", "Gas leak"));

    let form = harness.controller.unregister_form(FORM_ID).expect("form");
    assert_eq!(form.field("title").map(|field| field.value.as_str()), Some("Gas leak"));

    sleep(Duration::from_millis(1_500)).await;
    assert!(written_records(&harness.storage).is_empty());
}
