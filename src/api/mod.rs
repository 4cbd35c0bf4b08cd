// ==========================================
// 监考排班系统 - API 层
// ==========================================
// 职责: 引擎调用 + 持久化镜像写入 + 操作日志 + 事件发布
// 红线: 引擎成功后才写库; 所有成功的写操作记录 action_log
// ==========================================

pub mod allocation_api;
pub mod dashboard_api;
pub mod error;
pub mod registry_api;

pub use allocation_api::AllocationApi;
pub use dashboard_api::{AdminSummary, DashboardApi, InvigilatorSummary};
pub use error::{ApiError, ApiResult};
pub use registry_api::RegistryApi;

use chrono::{NaiveDateTime, SubsecRound};

/// 当前本地时刻 (秒级, 与库内时间戳精度一致)
pub(crate) fn current_time() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(0)
}

/// 空操作人记为 system
pub(crate) fn actor_or_system(operator: &str) -> &str {
    if operator.trim().is_empty() {
        "system"
    } else {
        operator
    }
}
