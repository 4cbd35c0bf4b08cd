// ==========================================
// 监考排班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod allocation;
pub mod invigilator;
pub mod types;
pub mod venue;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use allocation::Allocation;
pub use invigilator::Invigilator;
pub use types::{AllocationStatus, RecordStatus, Weekday};
pub use venue::Venue;
