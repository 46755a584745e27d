use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use taicho_core::view_model::log_entry_list::{ListDelta, LogEntryListModel};
use taicho_core::{AppContext, CoreConfig, FaultPolicy, LogEntry, NewLogEntry, ProductivityLevel};

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
            NewLogEntry::new(name, ProductivityLevel::Medium)
                .at(Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap())
                .in_timezone(Tz::UTC),
        )
        .unwrap()
}

fn row_names(list: &LogEntryListModel) -> Vec<String> {
    list.rows()
        .iter()
        .map(|row| row.display().name.clone())
        .collect()
}

#[test]
fn list_splices_inserts_by_time() {
    let mut ctx = context();
    create(&mut ctx, "Morning", 8);
    create(&mut ctx, "Evening", 20);
    ctx.save_context().unwrap();

    let mut list = LogEntryListModel::new(ctx.entries(), ctx.entries().get_all(ctx.store()));
    assert_eq!(row_names(&list), vec!["Evening", "Morning"]);

    create(&mut ctx, "Noon", 12);
    ctx.save_context().unwrap();

    let delta = list.sync();
    assert_eq!(
        delta,
        ListDelta {
            inserted: 1,
            reloaded: 0,
            removed: 0
        }
    );
    assert_eq!(row_names(&list), vec!["Evening", "Noon", "Morning"]);
}

#[test]
fn updates_reload_the_matching_row_and_broadcast() {
    let mut ctx = context();
    let entry = create(&mut ctx, "Email", 9);
    ctx.save_context().unwrap();

    let mut list = LogEntryListModel::new(ctx.entries(), vec![entry.clone()]);
    let row_changes = list.row(entry.id).unwrap().subscribe();

    let mut edited = entry.clone();
    edited.name = "Inbox zero".to_string();
    edited.productivity_level = ProductivityLevel::High;
    let (entries, store) = ctx.entries_and_store();
    entries.update(store, &edited).unwrap();
    ctx.save_context().unwrap();

    let delta = list.sync();
    assert_eq!(delta.reloaded, 1);
    assert_eq!(delta.inserted + delta.removed, 0);

    let row = list.row(entry.id).unwrap();
    assert_eq!(row.display().name, "Inbox zero");
    assert_eq!(row.display().productivity, "High");
    assert_eq!(row_changes.try_recv().unwrap(), edited);
}

#[test]
fn deletes_remove_rows_and_nothing_else_changes() {
    let mut ctx = context();
    let keep = create(&mut ctx, "Keep", 9);
    let dropped = create(&mut ctx, "Drop", 10);
    ctx.save_context().unwrap();

    let mut list = LogEntryListModel::new(ctx.entries(), ctx.entries().get_all(ctx.store()));

    let (entries, store) = ctx.entries_and_store();
    entries.delete(store, &[dropped]).unwrap();
    ctx.save_context().unwrap();

    assert_eq!(list.sync().removed, 1);
    assert_eq!(list.len(), 1);
    assert_eq!(list.rows()[0].id(), keep.id);
    assert!(list.sync().is_empty());
}
