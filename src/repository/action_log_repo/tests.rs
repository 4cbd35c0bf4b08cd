use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = crate::db::open_in_memory_connection().unwrap();
    crate::db::ensure_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 20)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = ActionLog::new(ActionType::Approve, "admin", at(9))
        .with_allocation("a1")
        .with_payload(json!({ "venue_id": "V1" }))
        .with_detail("审批");
    let id = repo.insert(&log).unwrap();

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.action_type, ActionType::Approve);
    assert_eq!(found.allocation_id.as_deref(), Some("a1"));
    assert_eq!(found.payload_json, Some(json!({ "venue_id": "V1" })));
    assert_eq!(found.action_ts, at(9));

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_list_recent_orders_by_time_desc() {
    let repo = ActionLogRepository::new(setup_test_db());
    repo.batch_insert(&[
        ActionLog::new(ActionType::GenerateDraft, "admin", at(8)),
        ActionLog::new(ActionType::Approve, "admin", at(10)).with_allocation("a1"),
        ActionLog::new(ActionType::Publish, "admin", at(11)).with_allocation("a1"),
    ])
    .unwrap();

    let recent: Vec<ActionType> = repo
        .list_recent(2)
        .unwrap()
        .into_iter()
        .map(|l| l.action_type)
        .collect();
    assert_eq!(recent, vec![ActionType::Publish, ActionType::Approve]);

    let history = repo.find_by_allocation("a1").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action_type, ActionType::Approve);
}
