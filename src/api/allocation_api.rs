// ==========================================
// 监考排班系统 - 分配 API
// ==========================================
// 职责: 草稿生成、审批、发布与分配查询
// ==========================================

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde_json::json;
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::api::{actor_or_system, current_time};
use crate::config::AllocationConfig;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::allocation::Allocation;
use crate::domain::types::AllocationStatus;
use crate::engine::events::{AllocationEvent, AllocationEventType, OptionalEventPublisher};
use crate::engine::generator::GenerationReport;
use crate::engine::orchestrator::{AllocationEngine, TransitionOutcome};
use crate::repository::action_log_repo::ActionLogRepository;

// ==========================================
// AllocationApi - 分配 API
// ==========================================
pub struct AllocationApi {
    engine: Arc<AllocationEngine>,
    action_log_repo: Arc<ActionLogRepository>,
    event_publisher: OptionalEventPublisher,
    config: AllocationConfig,
}

impl AllocationApi {
    pub fn new(
        engine: Arc<AllocationEngine>,
        action_log_repo: Arc<ActionLogRepository>,
        event_publisher: OptionalEventPublisher,
        config: AllocationConfig,
    ) -> Self {
        Self {
            engine,
            action_log_repo,
            event_publisher,
            config,
        }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 生成草稿
    ///
    /// # 参数
    /// - window_start: 窗口起始日期
    /// - window_length_days: 窗口天数, None 时取配置默认值
    /// - operator: 操作人
    pub fn generate_draft(
        &self,
        window_start: NaiveDate,
        window_length_days: Option<u32>,
        operator: &str,
    ) -> ApiResult<GenerationReport> {
        let days = window_length_days.unwrap_or(self.config.default_window_days);
        let now = current_time();

        // 引擎在写锁内完成写库, 失败时内存已回滚
        let report = self.engine.generate_draft(window_start, days, now)?;

        let window_end = window_start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(window_start);

        let log = ActionLog::new(ActionType::GenerateDraft, actor_or_system(operator), now)
            .with_payload(json!({
                "window_start": window_start.to_string(),
                "window_length_days": days,
                "produced": report.allocations.len(),
                "skipped_days": report.skipped_days(),
            }))
            .with_detail(format!(
                "生成草稿{}条 ({} ~ {})",
                report.allocations.len(),
                window_start,
                window_end
            ));
        self.record(&log);

        let ids = report.allocations.iter().map(|a| a.allocation_id.clone()).collect();
        self.emit(AllocationEvent::draft_generated(ids, (window_start, window_end), now));

        Ok(report)
    }

    /// 审批草稿
    pub fn approve(&self, allocation_id: &str, operator: &str) -> ApiResult<Allocation> {
        let allocation = self.engine.approve(allocation_id, current_time())?;
        self.after_transition(&allocation, ActionType::Approve, operator);
        Ok(allocation)
    }

    /// 发布已审批分配
    pub fn publish(&self, allocation_id: &str, operator: &str) -> ApiResult<Allocation> {
        let allocation = self.engine.publish(allocation_id, current_time())?;
        self.after_transition(&allocation, ActionType::Publish, operator);
        Ok(allocation)
    }

    /// 批量审批 (逐条独立)
    pub fn approve_many(&self, allocation_ids: &[String], operator: &str) -> ApiResult<Vec<TransitionOutcome>> {
        let outcomes = self.engine.approve_many(allocation_ids, current_time());
        self.record_outcomes(&outcomes, ActionType::Approve, operator);
        Ok(outcomes)
    }

    /// 批量发布 (逐条独立)
    pub fn publish_many(&self, allocation_ids: &[String], operator: &str) -> ApiResult<Vec<TransitionOutcome>> {
        let outcomes = self.engine.publish_many(allocation_ids, current_time());
        self.record_outcomes(&outcomes, ActionType::Publish, operator);
        Ok(outcomes)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_allocation(&self, allocation_id: &str) -> ApiResult<Allocation> {
        self.engine
            .store()
            .find_by_id(allocation_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Allocation(id={})不存在", allocation_id)))
    }

    /// 按监考员查询, status 为 "draft" / "approved" / "published" 或空
    pub fn list_for_invigilator(
        &self,
        invigilator_id: &str,
        status: Option<&str>,
    ) -> ApiResult<Vec<Allocation>> {
        let status_filter = status.map(parse_status).transpose()?;
        Ok(self.engine.list_for_invigilator(invigilator_id, status_filter)?)
    }

    /// 按星期标签查询
    pub fn list_by_day(&self, weekday: &str) -> ApiResult<Vec<Allocation>> {
        Ok(self.engine.list_by_day(weekday)?)
    }

    pub fn list_by_date_range(
        &self,
        start: NaiveDate,
        end_inclusive: NaiveDate,
        status: Option<&str>,
    ) -> ApiResult<Vec<Allocation>> {
        if end_inclusive < start {
            return Err(ApiError::InvalidInput(format!(
                "结束日期{}早于开始日期{}",
                end_inclusive, start
            )));
        }
        let status_filter = status.map(parse_status).transpose()?;
        Ok(self
            .engine
            .query()
            .list_by_date_range(start, end_inclusive, status_filter)?)
    }

    /// 最近的操作日志
    pub fn list_recent_actions(&self, limit: usize) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_recent(limit)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 已落库的状态变更: 记录日志并发布事件
    fn after_transition(&self, allocation: &Allocation, action_type: ActionType, operator: &str) {
        let log = ActionLog::new(action_type, actor_or_system(operator), allocation.updated_at)
            .with_allocation(&allocation.allocation_id)
            .with_payload(json!({
                "venue_id": allocation.venue_id,
                "invigilator_id": allocation.invigilator_id,
                "date": allocation.date.to_string(),
                "status": allocation.status,
            }));
        self.record(&log);

        let event_type = match action_type {
            ActionType::Publish => AllocationEventType::AllocationPublished,
            _ => AllocationEventType::AllocationApproved,
        };
        self.emit(AllocationEvent::single(
            event_type,
            &allocation.allocation_id,
            allocation.date,
            allocation.updated_at,
        ));
    }

    fn record_outcomes(&self, outcomes: &[TransitionOutcome], action_type: ActionType, operator: &str) {
        for allocation in outcomes.iter().filter_map(|o| o.allocation.as_ref()) {
            self.after_transition(allocation, action_type, operator);
        }
    }

    fn record(&self, log: &ActionLog) {
        if let Err(e) = self.action_log_repo.insert(log) {
            warn!("记录操作日志失败: {}", e);
        }
    }

    fn emit(&self, event: AllocationEvent) {
        if let Err(e) = self.event_publisher.publish(event.with_source("AllocationApi")) {
            warn!("发布分配事件失败: {}", e);
        }
    }
}

fn parse_status(label: &str) -> ApiResult<AllocationStatus> {
    AllocationStatus::parse(label)
        .ok_or_else(|| ApiError::InvalidInput(format!("未知的分配状态: {}", label)))
}
