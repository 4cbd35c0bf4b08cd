// ==========================================
// 监考排班系统 - 驾驶舱 API
// ==========================================
// 职责: 管理端总览 / 监考员个人总览 / 操作日志查询
// 红线: 监考员总览只包含 published
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::ActionLog;
use crate::domain::allocation::Allocation;
use crate::domain::types::Weekday;
use crate::engine::orchestrator::AllocationEngine;
use crate::engine::query::StatusCounts;
use crate::repository::action_log_repo::ActionLogRepository;

/// 管理端总览中"最近分配"的条数
pub const RECENT_ALLOCATION_LIMIT: usize = 5;

/// 管理端总览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub active_invigilators: usize,
    pub total_invigilators: usize,
    pub active_venues: usize,
    pub venue_limit: usize,
    /// 例: "5/20"
    pub venue_slots: String,
    pub total_capacity: u64,
    pub status_counts: StatusCounts,
    pub recent_allocations: Vec<Allocation>,
}

/// 监考员个人总览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvigilatorSummary {
    pub invigilator_id: String,
    pub name: String,
    pub availability: Vec<Weekday>,
    pub availability_day_count: usize,
    pub published_this_week: Vec<Allocation>,
    pub upcoming: Vec<Allocation>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    engine: Arc<AllocationEngine>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl DashboardApi {
    pub fn new(engine: Arc<AllocationEngine>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            engine,
            action_log_repo,
        }
    }

    /// 管理端总览
    pub fn admin_summary(&self) -> ApiResult<AdminSummary> {
        let invigilators = self.engine.invigilators();
        let venues = self.engine.venues();
        let query = self.engine.query();

        let active_venues = venues.active_count()?;
        let venue_limit = venues.max_active();

        Ok(AdminSummary {
            active_invigilators: invigilators.active_count()?,
            total_invigilators: invigilators.list()?.len(),
            active_venues,
            venue_limit,
            venue_slots: format!("{}/{}", active_venues, venue_limit),
            total_capacity: venues.total_capacity()?,
            status_counts: query.status_counts()?,
            recent_allocations: query.recent(RECENT_ALLOCATION_LIMIT)?,
        })
    }

    /// 监考员个人总览
    ///
    /// # 参数
    /// - invigilator_id: 监考员ID
    /// - today: 参考日期 (本周 = today..=today+7)
    pub fn invigilator_summary(&self, invigilator_id: &str, today: NaiveDate) -> ApiResult<InvigilatorSummary> {
        let invigilator = self
            .engine
            .invigilators()
            .find(invigilator_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Invigilator(id={})不存在", invigilator_id)))?;

        let query = self.engine.query();
        let availability: Vec<Weekday> = invigilator.availability.iter().copied().collect();

        Ok(InvigilatorSummary {
            invigilator_id: invigilator.invigilator_id.clone(),
            name: invigilator.name.clone(),
            availability_day_count: availability.len(),
            availability,
            published_this_week: query.this_week_for_invigilator(invigilator_id, today)?,
            upcoming: query.upcoming_for_invigilator(invigilator_id, today)?,
        })
    }

    /// 最近的操作日志
    pub fn list_recent_actions(&self, limit: usize) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_recent(limit)?)
    }
}
