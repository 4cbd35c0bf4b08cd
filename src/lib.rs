// ==========================================
// 监考排班系统 - 核心库
// ==========================================
// 职责: 在监考员可用日与考场之间生成每日分配, 经审批后发布
// 技术栈: Rust + SQLite
// 系统定位: 管理端排班工具 (人工审批与发布)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 内存存储与 SQLite 镜像
pub mod repository;

// 注册表层 - 监考员 / 考场
pub mod registry;

// 引擎层 - 生成 / 生命周期 / 查询
pub mod engine;

// 导入层 - 名册文件
pub mod importer;

// 配置层 - 分配配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationStatus, RecordStatus, Weekday};

// 领域实体
pub use domain::{ActionLog, ActionType, Allocation, Invigilator, Venue};

// 注册表
pub use registry::{InvigilatorRegistry, NewInvigilator, NewVenue, VenueRegistry};

// 引擎
pub use engine::{AllocationEngine, EngineError, EngineResult, GenerationReport, QueryEngine};

// API
pub use api::{AllocationApi, ApiError, ApiResult, DashboardApi, RegistryApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "监考排班系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
