// ==========================================
// 监考排班系统 - 分配生命周期管理
// ==========================================
// 状态机: draft --approve--> approved --publish--> published
// ==========================================
// 红线:
// - 同一 (venue, date) 至多一条 approved/published
// - 状态只能前进, 无回退, 无驳回
// - 转换合法性集中在此校验, 调用方不得自行修改 status
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::types::AllocationStatus;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::allocation_store::AllocationTable;
use chrono::NaiveDateTime;

// ==========================================
// LifecycleManager - 生命周期管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LifecycleManager;

impl LifecycleManager {
    pub fn new() -> Self {
        Self
    }

    /// 校验状态转换
    ///
    /// # 返回
    /// - `Ok(())`: 允许转换
    /// - `Err(InvalidStateTransition)`: 跳级/回退/重复
    pub fn check_transition(
        current: AllocationStatus,
        target: AllocationStatus,
    ) -> EngineResult<()> {
        if current.can_transition_to(target) {
            Ok(())
        } else {
            Err(EngineError::InvalidStateTransition {
                from: current,
                to: target,
            })
        }
    }

    /// 审批草稿
    ///
    /// 调用方必须持有存储写锁, 冲突检查与状态写入在同一临界区内完成。
    ///
    /// # 错误
    /// - `NotFound`: ID 未知
    /// - `InvalidStateTransition`: 当前状态不是 draft
    /// - `Conflict`: 同 (venue, date) 已有 approved/published
    pub fn approve(
        &self,
        table: &mut AllocationTable,
        allocation_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<Allocation> {
        let current = table
            .get(allocation_id)
            .ok_or_else(|| EngineError::allocation_not_found(allocation_id))?;

        Self::check_transition(current.status, AllocationStatus::Approved)?;

        if let Some(holder) = table.slot_holder(&current.venue_id, current.date, allocation_id) {
            return Err(EngineError::Conflict {
                venue_id: current.venue_id.clone(),
                date: current.date,
                holder_id: holder.allocation_id.clone(),
            });
        }

        Self::advance(table, allocation_id, AllocationStatus::Approved, now)
    }

    /// 发布已审批分配
    ///
    /// 审批时已确立 (venue, date) 独占, 此处不再复查。
    ///
    /// # 错误
    /// - `NotFound`: ID 未知
    /// - `InvalidStateTransition`: 当前状态不是 approved
    pub fn publish(
        &self,
        table: &mut AllocationTable,
        allocation_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<Allocation> {
        let current = table
            .get(allocation_id)
            .ok_or_else(|| EngineError::allocation_not_found(allocation_id))?;

        Self::check_transition(current.status, AllocationStatus::Published)?;

        Self::advance(table, allocation_id, AllocationStatus::Published, now)
    }

    fn advance(
        table: &mut AllocationTable,
        allocation_id: &str,
        target: AllocationStatus,
        now: NaiveDateTime,
    ) -> EngineResult<Allocation> {
        let record = table
            .get_mut(allocation_id)
            .ok_or_else(|| EngineError::allocation_not_found(allocation_id))?;
        record.status = target;
        record.updated_at = now;
        Ok(record.clone())
    }
}
