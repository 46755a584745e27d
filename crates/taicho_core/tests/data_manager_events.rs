use chrono::{TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use taicho_core::{
    AppContext, CoreConfig, EntityStore, FaultPolicy, LogEntry, LogEntryDataManager, NewLogEntry,
    ProductivityLevel,
};

fn context() -> AppContext {
    let config = CoreConfig {
        fault_policy: FaultPolicy::LogAndRecover,
        ..CoreConfig::in_memory()
    };
    AppContext::open(&config).unwrap()
}

fn create(ctx: &mut AppContext, name: &str, hour: u32) -> LogEntry {
    let (entries, store) = ctx.entries_and_store();
    entries
        .create(
            store,
            NewLogEntry::new(name, ProductivityLevel::High)
                .at(Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap())
                .in_timezone(Tz::UTC),
        )
        .unwrap()
}

#[test]
fn inserted_batch_carries_committed_entries_in_order() {
    let mut ctx = context();
    let inserted = ctx.entries().changes().subscribe_inserted();

    let first = create(&mut ctx, "Email", 9);
    let second = create(&mut ctx, "Standup", 10);
    ctx.save_context().unwrap();

    assert_eq!(inserted.try_recv().unwrap(), vec![first, second]);
    assert!(inserted.try_recv().is_err());
}

#[test]
fn single_field_update_yields_exactly_one_updated_batch() {
    let mut ctx = context();
    let entry = create(&mut ctx, "Email", 9);
    ctx.save_context().unwrap();

    let inserted = ctx.entries().changes().subscribe_inserted();
    let updated = ctx.entries().changes().subscribe_updated();
    let deleted = ctx.entries().changes().subscribe_deleted();

    let mut edited = entry.clone();
    edited.notes = Some("cleared inbox".to_string());
    let (entries, store) = ctx.entries_and_store();
    entries.update(store, &edited).unwrap();
    ctx.save_context().unwrap();

    let batches = updated.try_iter().collect::<Vec<_>>();
    assert_eq!(batches, vec![vec![edited]]);
    assert!(inserted.try_recv().is_err());
    assert!(deleted.try_recv().is_err());
}

#[test]
fn deleted_batch_carries_identities() {
    let mut ctx = context();
    let entry = create(&mut ctx, "Email", 9);
    ctx.save_context().unwrap();
    let deleted = ctx.entries().changes().subscribe_deleted();

    let (entries, store) = ctx.entries_and_store();
    entries.delete(store, std::slice::from_ref(&entry)).unwrap();
    ctx.save_context().unwrap();

    assert_eq!(deleted.try_recv().unwrap(), vec![entry.id]);
    assert!(ctx.entries().get(ctx.store(), entry.id).is_none());
}

#[test]
fn nothing_is_delivered_before_commit_or_after_rollback() {
    let mut ctx = context();
    let inserted = ctx.entries().changes().subscribe_inserted();

    create(&mut ctx, "Email", 9);
    assert!(ctx.store().has_changes());
    assert!(inserted.try_recv().is_err());

    ctx.rollback().unwrap();
    assert!(ctx.save_context().unwrap().is_none());
    assert!(inserted.try_recv().is_err());
}

#[test]
fn entry_commits_do_not_reach_preset_subscribers() {
    let mut ctx = context();
    let preset_inserts = ctx.presets().changes().subscribe_inserted();

    create(&mut ctx, "Email", 9);
    ctx.save_context().unwrap();

    assert!(preset_inserts.try_recv().is_err());
}

#[test]
fn commits_through_the_raw_store_reach_manager_channels() {
    let mut ctx = context();
    let inserted = ctx.entries().changes().subscribe_inserted();
    let updated = ctx.entries().changes().subscribe_updated();

    let entry = create(&mut ctx, "Email", 9);
    ctx.store_mut().save_context().unwrap();
    assert_eq!(inserted.try_recv().unwrap(), vec![entry.clone()]);

    let mut first_edit = entry.clone();
    first_edit.name = "Inbox".to_string();
    let (entries, store) = ctx.entries_and_store();
    entries.update(store, &first_edit).unwrap();
    store.save_context().unwrap();

    let mut second_edit = first_edit.clone();
    second_edit.name = "Inbox zero".to_string();
    let (entries, store) = ctx.entries_and_store();
    entries.update(store, &second_edit).unwrap();
    ctx.save_context().unwrap();

    // Each commit carries the state it committed, not the latest one.
    let batches = updated.try_iter().collect::<Vec<_>>();
    assert_eq!(batches, vec![vec![first_edit], vec![second_edit]]);
}

#[test]
fn bare_store_with_manager_delivers_on_commit() {
    let mut store = EntityStore::open_in_memory(FaultPolicy::LogAndRecover).unwrap();
    let manager = LogEntryDataManager::new(&store);
    let deleted = manager.changes().subscribe_deleted();
    assert_eq!(store.observer_count(), 1);

    let entry = manager
        .create(
            &mut store,
            NewLogEntry::new("Email", ProductivityLevel::Low).in_timezone(Tz::UTC),
        )
        .unwrap();
    store.save_context().unwrap();
    manager
        .delete(&mut store, std::slice::from_ref(&entry))
        .unwrap();
    store.save_context().unwrap();

    assert_eq!(deleted.try_recv().unwrap(), vec![entry.id]);

    drop(manager);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn created_entries_equal_their_reloaded_copy() {
    let mut ctx = context();
    let time = Utc
        .with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
        .unwrap()
        .with_nanosecond(123_456_789)
        .unwrap();

    let (entries, store) = ctx.entries_and_store();
    let created = entries
        .create(
            store,
            NewLogEntry::new("Email", ProductivityLevel::High)
                .at(time)
                .in_timezone(Tz::UTC),
        )
        .unwrap();
    ctx.save_context().unwrap();

    assert_eq!(created.time.nanosecond(), 123_000_000);
    assert_eq!(ctx.entries().get(ctx.store(), created.id), Some(created));
}

#[test]
fn names_are_stored_exactly_as_given() {
    let mut ctx = context();
    let created = create(&mut ctx, "Deep  work", 9);
    ctx.save_context().unwrap();

    assert_eq!(created.name, "Deep  work");
    let all = ctx.entries().get_all(ctx.store());
    assert_eq!(all, vec![created]);
}
