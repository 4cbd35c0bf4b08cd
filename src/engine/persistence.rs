// ==========================================
// 监考排班系统 - 引擎层持久化挂钩
// ==========================================
// 职责: 定义写穿 trait, 引擎在存储写锁内调用
// 说明: Engine 层只定义 trait, SQLite 实现位于 repository 层
// 红线: 挂钩返回错误时引擎回滚内存变更, 内存与库保持一致
// ==========================================

use crate::domain::allocation::Allocation;
use crate::repository::error::RepositoryResult;

/// 分配写穿挂钩
pub trait AllocationWriteThrough: Send + Sync {
    /// 新生成的草稿 (整体成功或整体失败)
    fn persist_drafts(&self, drafts: &[Allocation]) -> RepositoryResult<()>;

    /// 单条状态变更
    fn persist_transition(&self, allocation: &Allocation) -> RepositoryResult<()>;
}

/// 空操作挂钩 (纯内存引擎)
#[derive(Debug, Clone, Default)]
pub struct NoOpWriteThrough;

impl AllocationWriteThrough for NoOpWriteThrough {
    fn persist_drafts(&self, drafts: &[Allocation]) -> RepositoryResult<()> {
        tracing::trace!(count = drafts.len(), "NoOpWriteThrough: 跳过草稿写入");
        Ok(())
    }

    fn persist_transition(&self, _allocation: &Allocation) -> RepositoryResult<()> {
        Ok(())
    }
}
