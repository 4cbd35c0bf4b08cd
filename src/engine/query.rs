// ==========================================
// 监考排班系统 - 分配查询引擎
// ==========================================
// 职责: 分配存储的只读投影 (按监考员 / 按星期 / 按日期区间 / 按状态)
// 排序: 日期升序, 同日按ID升序
// 红线: 面向监考员的接口只返回 published
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::types::{AllocationStatus, Weekday};
use crate::engine::error::EngineResult;
use crate::repository::allocation_store::AllocationStore;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 各状态数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: usize,
    pub approved: usize,
    pub published: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.draft + self.approved + self.published
    }
}

// ==========================================
// QueryEngine - 查询引擎
// ==========================================
pub struct QueryEngine {
    store: Arc<AllocationStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<AllocationStore>) -> Self {
        Self { store }
    }

    /// 读锁内筛选并按 (date, id) 排序
    fn select<F>(&self, predicate: F) -> EngineResult<Vec<Allocation>>
    where
        F: Fn(&Allocation) -> bool,
    {
        let table = self.store.read()?;
        let mut rows: Vec<Allocation> = table.iter().filter(|a| predicate(*a)).cloned().collect();
        drop(table);

        rows.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.allocation_id.cmp(&b.allocation_id))
        });
        Ok(rows)
    }

    // ==========================================
    // 管理端查询 (任意状态)
    // ==========================================

    /// 按监考员查询, 可选状态过滤
    pub fn list_for_invigilator(
        &self,
        invigilator_id: &str,
        status_filter: Option<AllocationStatus>,
    ) -> EngineResult<Vec<Allocation>> {
        self.select(|a| {
            a.invigilator_id == invigilator_id && status_filter.map_or(true, |s| a.status == s)
        })
    }

    /// 按星期查询
    pub fn list_by_day(&self, weekday: Weekday) -> EngineResult<Vec<Allocation>> {
        self.select(|a| a.weekday == weekday)
    }

    /// 按日期区间查询 (闭区间)
    pub fn list_by_date_range(
        &self,
        start: NaiveDate,
        end_inclusive: NaiveDate,
        status_filter: Option<AllocationStatus>,
    ) -> EngineResult<Vec<Allocation>> {
        self.select(|a| {
            a.date >= start
                && a.date <= end_inclusive
                && status_filter.map_or(true, |s| a.status == s)
        })
    }

    /// 按状态查询
    pub fn list_by_status(&self, status: AllocationStatus) -> EngineResult<Vec<Allocation>> {
        self.select(|a| a.status == status)
    }

    /// 各状态数量
    pub fn status_counts(&self) -> EngineResult<StatusCounts> {
        let table = self.store.read()?;
        let mut counts = StatusCounts::default();
        for allocation in table.iter() {
            match allocation.status {
                AllocationStatus::Draft => counts.draft += 1,
                AllocationStatus::Approved => counts.approved += 1,
                AllocationStatus::Published => counts.published += 1,
            }
        }
        Ok(counts)
    }

    /// 最近更新的分配 (updated_at 降序)
    pub fn recent(&self, limit: usize) -> EngineResult<Vec<Allocation>> {
        let mut rows = self.store.snapshot()?;
        rows.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.allocation_id.cmp(&b.allocation_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    // ==========================================
    // 监考员端查询 (仅 published)
    // ==========================================

    /// 监考员可见的全部分配
    pub fn published_for_invigilator(&self, invigilator_id: &str) -> EngineResult<Vec<Allocation>> {
        self.list_for_invigilator(invigilator_id, Some(AllocationStatus::Published))
    }

    /// 监考员今日及以后的已发布分配
    pub fn upcoming_for_invigilator(
        &self,
        invigilator_id: &str,
        today: NaiveDate,
    ) -> EngineResult<Vec<Allocation>> {
        self.select(|a| a.invigilator_id == invigilator_id && a.is_published() && a.date >= today)
    }

    /// 监考员未来 7 天内 (含今日与第 7 天) 的已发布分配
    pub fn this_week_for_invigilator(
        &self,
        invigilator_id: &str,
        today: NaiveDate,
    ) -> EngineResult<Vec<Allocation>> {
        let week_end = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        self.select(|a| {
            a.invigilator_id == invigilator_id
                && a.is_published()
                && a.date >= today
                && a.date <= week_end
        })
    }
}
