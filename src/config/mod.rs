// ==========================================
// 监考排班系统 - 配置层
// ==========================================
// 职责: 分配引擎配置, 支持库内覆写
// 存储: config_kv 表 (scope_id='global')
// ==========================================

pub mod allocation_config;
pub mod config_manager;

pub use allocation_config::AllocationConfig;
pub use config_manager::{config_keys, ConfigManager};
