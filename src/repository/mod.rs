// ==========================================
// 监考排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 内存分配存储 + SQLite 持久化适配
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod allocation_repo;
pub mod allocation_store;
pub mod error;
pub mod invigilator_repo;
pub mod row_codec;
pub mod venue_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use allocation_repo::AllocationRepository;
pub use allocation_store::{AllocationStore, AllocationTable};
pub use error::{RepositoryError, RepositoryResult};
pub use invigilator_repo::InvigilatorRepository;
pub use venue_repo::VenueRepository;
