// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试目标: 管理端总览与监考员视图
// ==========================================

mod test_helpers;

use invigilation_aps::api::ApiError;
use invigilation_aps::domain::types::{RecordStatus, Weekday};
use test_helpers::{add_invigilator, add_venue, create_test_state, monday, monday_plus, OPERATOR};

#[test]
fn test_admin_summary_counts() {
    let (_tmp, _path, state) = create_test_state().unwrap();
    let alice = add_invigilator(&state, "Alice", &[Weekday::Monday, Weekday::Tuesday]);
    add_invigilator(&state, "Bob", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");
    let spare = add_venue(&state, "IT Block", "Hall 202");

    let report = state
        .allocation_api
        .generate_draft(monday(), Some(2), OPERATOR)
        .unwrap();
    let first = &report.allocations[0].allocation_id;
    state.allocation_api.approve(first, OPERATOR).unwrap();

    state
        .registry_api
        .set_invigilator_status(&alice.invigilator_id, RecordStatus::Inactive, OPERATOR)
        .unwrap();
    state
        .registry_api
        .set_venue_status(&spare.venue_id, RecordStatus::Inactive, OPERATOR)
        .unwrap();

    let summary = state.dashboard_api.admin_summary().unwrap();
    assert_eq!(summary.total_invigilators, 2);
    assert_eq!(summary.active_invigilators, 1);
    assert_eq!(summary.active_venues, 1);
    assert_eq!(summary.venue_limit, 20);
    assert_eq!(summary.venue_slots, "1/20");
    assert_eq!(summary.total_capacity, 40);

    // 周一 2 个考场 + 周二 2 个考场
    assert_eq!(summary.status_counts.total(), 4);
    assert_eq!(summary.status_counts.approved, 1);
    assert_eq!(summary.status_counts.draft, 3);
    assert_eq!(summary.recent_allocations.len(), 4);
}

#[test]
fn test_invigilator_summary_only_shows_published() {
    let (_tmp, _path, state) = create_test_state().unwrap();
    let alice = add_invigilator(&state, "Alice", &Weekday::ALL);
    add_venue(&state, "IT Block", "Hall 201");

    let report = state
        .allocation_api
        .generate_draft(monday(), Some(14), OPERATOR)
        .unwrap();

    // 发布第 1 天与第 10 天
    for allocation in &report.allocations {
        if allocation.date == monday() || allocation.date == monday_plus(9) {
            state
                .allocation_api
                .approve(&allocation.allocation_id, OPERATOR)
                .unwrap();
            state
                .allocation_api
                .publish(&allocation.allocation_id, OPERATOR)
                .unwrap();
        }
    }

    let view = state
        .dashboard_api
        .invigilator_summary(&alice.invigilator_id, monday())
        .unwrap();

    assert_eq!(view.name, "Alice");
    assert_eq!(view.availability_day_count, 7);
    assert_eq!(view.published_this_week.len(), 1);
    assert_eq!(view.published_this_week[0].date, monday());
    assert_eq!(view.upcoming.len(), 2);
    assert!(view.upcoming.iter().all(|a| a.is_published()));
}

#[test]
fn test_invigilator_summary_unknown_id() {
    let (_tmp, _path, state) = create_test_state().unwrap();

    let result = state.dashboard_api.invigilator_summary("missing", monday());
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_recent_actions_newest_first() {
    let (_tmp, _path, state) = create_test_state().unwrap();
    add_invigilator(&state, "Alice", &[Weekday::Monday]);
    add_venue(&state, "IT Block", "Hall 201");
    state
        .allocation_api
        .generate_draft(monday(), Some(1), OPERATOR)
        .unwrap();

    let actions = state.dashboard_api.list_recent_actions(2).unwrap();
    assert_eq!(actions.len(), 2);
    assert!(actions[0].action_ts >= actions[1].action_ts);
}
