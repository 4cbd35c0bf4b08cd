// ==========================================
// 监考排班系统 - 应用层
// ==========================================
// 职责: 应用状态装配 (数据库 → 注册表/存储 → API)
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
