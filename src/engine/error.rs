// ==========================================
// 监考排班系统 - 引擎层错误类型
// ==========================================
// 错误分类: 校验 / 未找到 / 非法状态转换 / 冲突 / 容量超限 / 写库失败
// 红线: 所有错误同步返回调用方, 不吞错, 不重试
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::AllocationStatus;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 输入缺失或非法 (例: 空窗口)
    #[error("数据验证失败: {0}")]
    Validation(String),

    /// 未知ID
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    /// 当前状态不允许该转换
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition {
        from: AllocationStatus,
        to: AllocationStatus,
    },

    /// 同一 (venue, date) 已有已审批/已发布分配
    #[error("考场占用冲突: venue_id={venue_id}, date={date}, holder={holder_id}")]
    Conflict {
        venue_id: String,
        date: NaiveDate,
        holder_id: String,
    },

    /// 考场注册表已达上限
    #[error("启用考场数量已达上限: limit={limit}")]
    CapacityExceeded { limit: usize },

    /// 存储层错误 (锁中毒等)
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// 写穿失败, 内存变更已回滚
    #[error("写库失败: {0}")]
    Persistence(RepositoryError),
}

impl EngineError {
    /// 分配记录不存在
    pub fn allocation_not_found(id: &str) -> Self {
        EngineError::NotFound {
            entity: "Allocation",
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
