// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-tab synchronization over a real SQLite file.

use cadence_config::model::{CadenceConfig, StorageConfig};
use cadence_core::StorageKey;
use cadence_features::{
    AppContext, Board, CollabTable, ColumnId, Planner, PlannerItem, Priority, ProductionCard,
    TaskList,
};
use chrono::NaiveDate;

fn config(dir: &tempfile::TempDir) -> CadenceConfig {
    CadenceConfig {
        storage: StorageConfig {
            database_path: dir.path().join("sync.db").to_string_lossy().to_string(),
            wal_mode: true,
            namespace: "cadence".into(),
        },
        ..CadenceConfig::default()
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

#[test]
fn planner_save_reaches_other_tab_after_poll() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let tab_b = tab_a.share();
    let mut watcher_b = tab_b.watcher().unwrap();

    let planner_a = Planner::mount(&tab_a);
    let planner_b = Planner::mount(&tab_b);

    let id = planner_a
        .add_item(
            day(2),
            PlannerItem {
                text: "Film intro".into(),
                start_time: Some("09:00".into()),
                end_time: Some("10:30".into()),
                ..PlannerItem::default()
            },
        )
        .unwrap();

    assert!(planner_b.day(day(2)).is_none());
    assert_eq!(watcher_b.poll().unwrap(), 1);

    let seen = planner_b.day(day(2)).unwrap();
    assert_eq!(seen.items.len(), 1);
    assert_eq!(seen.items[0].id, id);
}

#[test]
fn burst_of_writes_collapses_to_latest_value() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let tab_b = tab_a.share();
    let mut watcher_b = tab_b.watcher().unwrap();

    let tasks_a = TaskList::mount(&tab_a);
    let tasks_b = TaskList::mount(&tab_b);
    for text in ["one", "two", "three"] {
        tasks_a.add(text, None, Priority::Medium).unwrap();
    }

    assert_eq!(watcher_b.poll().unwrap(), 1);
    assert_eq!(tasks_b.tasks().len(), 3);
    assert_eq!(watcher_b.poll().unwrap(), 0);
}

#[test]
fn own_writes_are_not_echoed_by_own_watcher() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let mut watcher_a = tab_a.watcher().unwrap();

    let board = Board::mount(&tab_a);
    let revision = board.state().revision();
    board
        .add_card(ColumnId::Ideate, ProductionCard::new("Q2 launch"))
        .unwrap();

    assert_eq!(watcher_a.poll().unwrap(), 0);
    assert!(board.state().revision() > revision);
}

#[test]
fn last_writer_wins_between_tabs() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let tab_b = tab_a.share();
    let mut watcher_a = tab_a.watcher().unwrap();
    let mut watcher_b = tab_b.watcher().unwrap();

    let table_a = CollabTable::mount(&tab_a);
    let table_b = CollabTable::mount(&tab_b);

    table_a.handle_add_brand("Acme").unwrap();
    table_b.handle_add_brand("Globex").unwrap();

    watcher_a.poll().unwrap();
    watcher_b.poll().unwrap();

    let names = |t: &CollabTable| -> Vec<String> {
        t.brands().into_iter().map(|b| b.brand_name).collect()
    };
    assert_eq!(names(&table_a), vec!["Globex".to_string()]);
    assert_eq!(names(&table_b), vec!["Globex".to_string()]);
}

#[test]
fn removal_in_one_tab_resets_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let tab_b = tab_a.share();
    let mut watcher_b = tab_b.watcher().unwrap();

    let tasks_a = TaskList::mount(&tab_a);
    tasks_a.add("draft script", None, Priority::High).unwrap();
    let tasks_b = TaskList::mount(&tab_b);
    assert_eq!(tasks_b.tasks().len(), 1);

    tasks_a.state().clear().unwrap();
    assert_eq!(watcher_b.poll().unwrap(), 1);
    assert!(tasks_b.tasks().is_empty());
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    {
        let ctx = AppContext::open(&cfg).unwrap();
        TaskList::mount(&ctx)
            .add("renew domain", Some(day(9)), Priority::Low)
            .unwrap();
    }
    let ctx = AppContext::open(&cfg).unwrap();
    let tasks = TaskList::mount(&ctx).tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].due_date, Some(day(9)));
}

#[test]
fn legacy_planner_data_is_repaired_on_mount() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = AppContext::open(&config(&dir)).unwrap();
    ctx.storage
        .set(
            &StorageKey::PlannerData,
            r#"[{"date":"2026-03-04","items":[{"text":"late","startTime":"25:30","endTime":"26:00"}]}]"#,
        )
        .unwrap();

    let planner = Planner::mount(&ctx);
    let repaired = planner.day(day(4)).unwrap();
    let item = &repaired.items[0];
    assert_eq!(item.start_time.as_deref(), Some("22:59"));
    assert_eq!(item.end_time.as_deref(), Some("23:59"));
    assert!(!item.id.is_empty());

    let raw = ctx.storage.get(&StorageKey::PlannerData).unwrap();
    assert!(raw.starts_with(r#"{"version":"#));
}

#[test]
fn lagging_tab_catches_up_after_change_log_is_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = AppContext::open(&config(&dir)).unwrap();
    let tab_b = tab_a.share();
    let mut watcher_b = tab_b.watcher().unwrap();

    let tasks_a = TaskList::mount(&tab_a);
    let tasks_b = TaskList::mount(&tab_b);
    tasks_a.add("send invoice", None, Priority::High).unwrap();
    for i in 0..=1000 {
        tab_a
            .storage
            .set(&StorageKey::SidebarMenu, &format!("[{i}]"))
            .unwrap();
    }

    assert!(watcher_b.poll().unwrap() > 0);
    let seen = tasks_b.tasks();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].text, "send invoice");
}
