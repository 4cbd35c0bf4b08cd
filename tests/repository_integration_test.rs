// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 写入镜像 + 重启回填 + 库内约束
// ==========================================

mod test_helpers;

use std::sync::{Arc, Mutex};

use invigilation_aps::db::{ensure_schema, open_sqlite_connection};
use invigilation_aps::api::ApiError;
use invigilation_aps::domain::action_log::ActionType;
use invigilation_aps::domain::types::{AllocationStatus, RecordStatus, Weekday};
use invigilation_aps::repository::{
    ActionLogRepository, AllocationRepository, InvigilatorRepository, RepositoryError,
    VenueRepository,
};
use test_helpers::{add_invigilator, add_venue, create_test_state, monday, reopen_state, OPERATOR};

#[test]
fn test_state_is_hydrated_after_restart() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    let alice = add_invigilator(&state, "Alice", &[Weekday::Monday, Weekday::Friday]);
    let hall = add_venue(&state, "IT Block", "Hall 201");

    let report = state
        .allocation_api
        .generate_draft(monday(), Some(7), OPERATOR)
        .unwrap();
    let first = report.allocations[0].allocation_id.clone();
    state.allocation_api.approve(&first, OPERATOR).unwrap();
    state.allocation_api.publish(&first, OPERATOR).unwrap();
    drop(state);

    let restarted = reopen_state(&db_path).unwrap();

    let invigilators = restarted.registry_api.list_invigilators().unwrap();
    assert_eq!(invigilators.len(), 1);
    assert_eq!(invigilators[0].invigilator_id, alice.invigilator_id);
    assert_eq!(invigilators[0].availability, alice.availability);

    let venues = restarted.registry_api.list_venues().unwrap();
    assert_eq!(venues, vec![hall]);

    let restored = restarted.engine.store().snapshot().unwrap();
    assert_eq!(restored.len(), 2);

    let published = restarted.allocation_api.get_allocation(&first).unwrap();
    assert_eq!(published.status, AllocationStatus::Published);
    assert_eq!(published.date, monday());
    assert_eq!(published.weekday, Weekday::Monday);

    // 回填后继续生命周期
    let other = restored
        .iter()
        .find(|a| a.allocation_id != first)
        .unwrap()
        .allocation_id
        .clone();
    let approved = restarted.allocation_api.approve(&other, OPERATOR).unwrap();
    assert_eq!(approved.status, AllocationStatus::Approved);
}

#[test]
fn test_registry_changes_survive_restart() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    let alice = add_invigilator(&state, "Alice", &[Weekday::Monday]);
    let hall = add_venue(&state, "IT Block", "Hall 201");

    state
        .registry_api
        .update_availability(
            &alice.invigilator_id,
            &["tue".to_string(), "Thursday".to_string()],
            OPERATOR,
        )
        .unwrap();
    state
        .registry_api
        .set_venue_status(&hall.venue_id, RecordStatus::Inactive, OPERATOR)
        .unwrap();
    drop(state);

    let restarted = reopen_state(&db_path).unwrap();
    let restored = restarted
        .engine
        .invigilators()
        .find(&alice.invigilator_id)
        .unwrap()
        .unwrap();
    assert!(restored.is_available_on(Weekday::Tuesday));
    assert!(restored.is_available_on(Weekday::Thursday));
    assert!(!restored.is_available_on(Weekday::Monday));

    let venue = restarted.engine.venues().find(&hall.venue_id).unwrap().unwrap();
    assert_eq!(venue.status, RecordStatus::Inactive);
}

#[test]
fn test_slot_unique_index_rejects_second_holder() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");

    let first = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap();
    let second = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap();
    state
        .allocation_api
        .approve(&first.allocations[0].allocation_id, OPERATOR)
        .unwrap();
    drop(state);

    // 绕过引擎直接写库, 由部分唯一索引兜底
    let conn = open_sqlite_connection(&db_path).unwrap();
    let repo = AllocationRepository::new(Arc::new(Mutex::new(conn)));
    let loser = &second.allocations[0];
    let result = repo.update_status(
        &loser.allocation_id,
        AllocationStatus::Approved,
        loser.updated_at,
    );
    assert!(matches!(result, Err(RepositoryError::SlotAlreadyHeld(_))));

    let stored = repo.find_by_id(&loser.allocation_id).unwrap().unwrap();
    assert_eq!(stored.status, AllocationStatus::Draft);
}

#[test]
fn test_update_status_of_unknown_row_is_not_found() {
    let (_tmp, db_path, _state) = create_test_state().unwrap();
    let conn = open_sqlite_connection(&db_path).unwrap();
    let repo = AllocationRepository::new(Arc::new(Mutex::new(conn)));

    let result = repo.update_status(
        "missing",
        AllocationStatus::Approved,
        monday().and_hms_opt(9, 0, 0).unwrap(),
    );
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_repositories_round_trip_master_data() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    let alice = add_invigilator(&state, "Alice", &[Weekday::Saturday, Weekday::Monday]);
    let hall = add_venue(&state, "Arts Block", "Hall 101");

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    ensure_schema(&conn.lock().unwrap()).unwrap();

    let invigilator_repo = InvigilatorRepository::new(conn.clone());
    let venue_repo = VenueRepository::new(conn.clone());

    assert_eq!(
        invigilator_repo.find_by_id(&alice.invigilator_id).unwrap(),
        Some(alice.clone())
    );
    assert_eq!(venue_repo.find_by_id(&hall.venue_id).unwrap(), Some(hall));
    assert_eq!(invigilator_repo.find_by_id("missing").unwrap(), None);
}

#[test]
fn test_action_log_is_linked_to_allocation() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");

    let report = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap();
    let id = report.allocations[0].allocation_id.clone();
    state.allocation_api.approve(&id, OPERATOR).unwrap();
    state.allocation_api.publish(&id, OPERATOR).unwrap();

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    let repo = ActionLogRepository::new(conn);
    let logs = repo.find_by_allocation(&id).unwrap();

    let types: Vec<ActionType> = logs.iter().map(|l| l.action_type).collect();
    assert_eq!(types.len(), 2);
    assert!(types.contains(&ActionType::Approve));
    assert!(types.contains(&ActionType::Publish));
}

/// 用第二条连接删除库中记录, 模拟写库失败
fn delete_row(db_path: &str, allocation_id: &str) {
    let conn = open_sqlite_connection(db_path).unwrap();
    conn.execute(
        "DELETE FROM allocation WHERE allocation_id = ?1",
        [allocation_id],
    )
    .unwrap();
}

#[test]
fn test_failed_write_leaves_memory_unchanged_and_retry_succeeds() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");

    let report = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap();
    let draft = report.allocations[0].clone();
    delete_row(&db_path, &draft.allocation_id);

    let result = state.allocation_api.approve(&draft.allocation_id, OPERATOR);
    assert!(matches!(result, Err(ApiError::DatabaseError(_))));

    let in_memory = state.allocation_api.get_allocation(&draft.allocation_id).unwrap();
    assert_eq!(in_memory.status, AllocationStatus::Draft);
    assert_eq!(in_memory.updated_at, draft.updated_at);

    // 失败的审批不产生日志
    let logs = state.action_log_repo.find_by_allocation(&draft.allocation_id).unwrap();
    assert!(logs.is_empty());

    // 库恢复后重试成功, 内存与库一致
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    let repo = AllocationRepository::new(conn);
    repo.upsert(&draft).unwrap();

    let approved = state
        .allocation_api
        .approve(&draft.allocation_id, OPERATOR)
        .unwrap();
    assert_eq!(approved.status, AllocationStatus::Approved);
    let stored = repo.find_by_id(&draft.allocation_id).unwrap().unwrap();
    assert_eq!(stored.status, AllocationStatus::Approved);
    assert_eq!(stored.updated_at, approved.updated_at);
}

#[test]
fn test_failed_publish_keeps_allocation_approved() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");

    let id = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap()
        .allocations[0]
        .allocation_id
        .clone();
    state.allocation_api.approve(&id, OPERATOR).unwrap();
    delete_row(&db_path, &id);

    assert!(matches!(
        state.allocation_api.publish(&id, OPERATOR),
        Err(ApiError::DatabaseError(_))
    ));
    assert_eq!(
        state.allocation_api.get_allocation(&id).unwrap().status,
        AllocationStatus::Approved
    );
    // 没有发布成功的记录, 监考员视图为空
    assert!(state
        .engine
        .query()
        .list_by_status(AllocationStatus::Published)
        .unwrap()
        .is_empty());
}

#[test]
fn test_failed_generation_write_is_undone_in_memory() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");

    let conn = open_sqlite_connection(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_allocation_insert BEFORE INSERT ON allocation
         BEGIN SELECT RAISE(ABORT, 'allocation table is read-only'); END;",
    )
    .unwrap();

    let result = state
        .allocation_api
        .generate_draft(monday(), Some(7), OPERATOR)
        .unwrap_err();
    assert!(matches!(result, ApiError::DatabaseError(_)));
    assert!(state.engine.store().snapshot().unwrap().is_empty());

    conn.execute_batch("DROP TRIGGER reject_allocation_insert;").unwrap();
    let report = state
        .allocation_api
        .generate_draft(monday(), Some(7), OPERATOR)
        .unwrap();
    assert_eq!(report.allocations.len(), 1);
    assert_eq!(state.engine.store().snapshot().unwrap().len(), 1);
}

#[test]
fn test_batch_approval_reports_write_failures_per_id() {
    let (_tmp, db_path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");
    add_venue(&state, "IT Block", "Hall 202");
    add_venue(&state, "IT Block", "Hall 203");

    let ids: Vec<String> = state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap()
        .allocations
        .into_iter()
        .map(|a| a.allocation_id)
        .collect();
    assert_eq!(ids.len(), 3);
    delete_row(&db_path, &ids[0]);

    let outcomes = state.allocation_api.approve_many(&ids, OPERATOR).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(!outcomes[0].succeeded());
    assert!(outcomes[1].succeeded());
    assert!(outcomes[2].succeeded());

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    let repo = AllocationRepository::new(conn);
    for id in &ids[1..] {
        let stored = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, AllocationStatus::Approved);
        let logs = state.action_log_repo.find_by_allocation(id).unwrap();
        assert_eq!(logs.len(), 1);
    }
    assert_eq!(
        state.allocation_api.get_allocation(&ids[0]).unwrap().status,
        AllocationStatus::Draft
    );
}
