use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use taicho_core::db::open_db_in_memory;
use taicho_core::repo::query::{Predicate, SortOrder};
use taicho_core::repo::schema::{field, EntityKind};
use taicho_core::{
    ChangeKind, EntityStore, FaultPolicy, LogEntry, LogEntryPreset, ProductivityLevel, StoreError,
    ValidationError,
};
use uuid::Uuid;

fn store() -> EntityStore {
    EntityStore::open_in_memory(FaultPolicy::LogAndRecover).unwrap()
}

fn stage_entry(store: &mut EntityStore, name: &str, hour: u32) -> LogEntry {
    store
        .create_new_object(|id| LogEntry {
            id,
            name: name.to_string(),
            time: Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap(),
            timezone: Tz::UTC,
            productivity_level: ProductivityLevel::Medium,
            notes: None,
        })
        .unwrap()
}

#[test]
fn create_and_save_adds_exactly_one_record_with_fresh_id() {
    let mut store = store();
    let existing = stage_entry(&mut store, "Breakfast", 7);
    store.save_context().unwrap();

    let created = stage_entry(&mut store, "Email", 9);
    assert_ne!(created.id, existing.id);
    assert!(!created.id.is_nil());
    store.save_context().unwrap();

    let all = store.get_all_objects::<LogEntry>(None, None);
    assert_eq!(all.len(), 2);
    let loaded = all.iter().find(|entry| entry.id == created.id).unwrap();
    assert_eq!(loaded, &created);
}

#[test]
fn staged_changes_are_visible_before_commit_and_gone_after_rollback() {
    let mut store = store();
    let staged = stage_entry(&mut store, "Email", 9);

    assert!(store.has_changes());
    assert_eq!(
        store.get_object::<LogEntry>(staged.id).unwrap(),
        Some(staged.clone())
    );

    store.rollback().unwrap();
    assert!(!store.has_changes());
    assert_eq!(store.get_object::<LogEntry>(staged.id).unwrap(), None);
    assert!(store.save_context().unwrap().is_none());
}

#[test]
fn save_context_reports_folded_changes_with_increasing_sequence() {
    let mut store = store();
    let saves = store.subscribe();

    let kept = stage_entry(&mut store, "Email", 9);
    let first = store.save_context().unwrap().unwrap();
    assert_eq!(first.sequence, 1);
    assert_eq!(first.ids(EntityKind::LogEntry, ChangeKind::Inserted), &[kept.id]);

    let transient = stage_entry(&mut store, "Typo", 10);
    let mut renamed = kept.clone();
    renamed.name = "Inbox zero".to_string();
    store.update(&renamed).unwrap();
    store.update(&renamed).unwrap();
    store.delete(&[transient]).unwrap();

    let second = store.save_context().unwrap().unwrap();
    assert_eq!(second.sequence, 2);
    assert!(second.ids(EntityKind::LogEntry, ChangeKind::Inserted).is_empty());
    assert_eq!(second.ids(EntityKind::LogEntry, ChangeKind::Updated), &[kept.id]);
    assert!(second.ids(EntityKind::LogEntry, ChangeKind::Deleted).is_empty());

    let received = saves.try_iter().collect::<Vec<_>>();
    assert_eq!(received, vec![first, second]);
}

#[test]
fn deleted_ids_never_reappear() {
    let mut store = store();
    let entry = stage_entry(&mut store, "Email", 9);
    store.save_context().unwrap();

    store.delete(std::slice::from_ref(&entry)).unwrap();
    let saved = store.save_context().unwrap().unwrap();
    assert_eq!(saved.ids(EntityKind::LogEntry, ChangeKind::Deleted), &[entry.id]);

    assert_eq!(store.get_object::<LogEntry>(entry.id).unwrap(), None);
    stage_entry(&mut store, "Email", 9);
    store.save_context().unwrap();
    assert!(store
        .get_all_objects::<LogEntry>(None, None)
        .iter()
        .all(|other| other.id != entry.id));
}

#[test]
fn deleting_a_missing_record_is_skipped() {
    let mut store = store();
    let entry = stage_entry(&mut store, "Email", 9);
    store.rollback().unwrap();

    store.delete(&[entry]).unwrap();
    assert!(!store.has_changes());
}

#[test]
fn updating_a_missing_record_is_not_found() {
    let mut store = store();
    let ghost = LogEntryPreset {
        id: Uuid::new_v4(),
        name: "Ghost".to_string(),
        productivity_level: ProductivityLevel::Low,
        icon: "👻".to_string(),
    };
    let err = store.update(&ghost).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id, .. } if id == ghost.id));
}

#[test]
fn invalid_records_are_rejected_before_any_write() {
    let mut store = store();
    let err = store
        .create_new_object(|id| LogEntry {
            id,
            name: "   ".to_string(),
            time: Utc::now(),
            timezone: Tz::UTC,
            productivity_level: ProductivityLevel::High,
            notes: None,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyName)));
    assert!(!store.has_changes());
}

#[test]
fn duplicate_preset_name_is_a_constraint_error() {
    let mut store = store();
    let reading = |id| LogEntryPreset {
        id,
        name: "Reading".to_string(),
        productivity_level: ProductivityLevel::High,
        icon: "📖".to_string(),
    };
    store.create_new_object(reading).unwrap();
    store.save_context().unwrap();

    let err = store.create_new_object(reading).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint {
            entity: "LogEntryPreset",
            ..
        }
    ));
}

#[test]
fn unregistered_kinds_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut store = EntityStore::with_kinds(
        conn,
        &[EntityKind::LogEntryPreset],
        FaultPolicy::LogAndRecover,
    );

    assert!(store.entity_kind_named("LogEntryPreset").is_ok());
    assert!(matches!(
        store.entity_kind_named("LogEntry"),
        Err(StoreError::UnregisteredEntity(name)) if name == "LogEntry"
    ));
    assert!(matches!(
        store.entity_kind_named("Invoice"),
        Err(StoreError::UnregisteredEntity(_))
    ));

    let err = store
        .create_new_object(|id| LogEntry {
            id,
            name: "Email".to_string(),
            time: Utc::now(),
            timezone: Tz::UTC,
            productivity_level: ProductivityLevel::High,
            notes: None,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::UnregisteredEntity(_)));
    assert!(store.get_all_objects::<LogEntry>(None, None).is_empty());
}

#[test]
fn fetch_filters_and_sorts_by_mapped_fields() {
    let mut store = store();
    stage_entry(&mut store, "Write report", 9);
    stage_entry(&mut store, "Lunch", 12);
    stage_entry(&mut store, "Review report", 15);
    store.save_context().unwrap();

    let reports = store.get_all_objects::<LogEntry>(
        Some(&Predicate::contains(field::NAME, "report")),
        Some(&SortOrder::descending(field::TIME)),
    );
    let names = reports
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Review report", "Write report"]);

    let err = store
        .try_get_all_objects::<LogEntry>(Some(&Predicate::equals("icon", "x".to_string())), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownField { field, .. } if field == "icon"));
    assert!(store
        .get_all_objects::<LogEntry>(Some(&Predicate::equals("icon", "x".to_string())), None)
        .is_empty());
}
