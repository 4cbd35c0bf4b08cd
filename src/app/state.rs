// ==========================================
// 监考排班系统 - 应用状态管理
// ==========================================
// 职责: 打开数据库, 从持久化层回填注册表与分配存储, 装配各 API
// ==========================================
// 回填顺序: schema → 配置 → 监考员 → 考场 → 分配
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{AllocationApi, ApiError, DashboardApi, RegistryApi};
use crate::config::{AllocationConfig, ConfigManager};
use crate::db::{ensure_schema, open_in_memory_connection, open_sqlite_connection};
use crate::engine::events::{AllocationEventPublisher, OptionalEventPublisher};
use crate::engine::AllocationEngine;
use crate::registry::{InvigilatorRegistry, VenueRegistry};
use crate::repository::{
    ActionLogRepository, AllocationRepository, AllocationStore, InvigilatorRepository,
    VenueRepository,
};

/// 环境变量: 显式指定数据库路径
pub const DB_PATH_ENV: &str = "INVIGILATION_APS_DB_PATH";

// ==========================================
// AppState - 应用状态
// ==========================================

/// 应用状态
///
/// 持有所有 API 实例, 供 CLI 或上层宿主共享。
pub struct AppState {
    /// 数据库路径 (内存库为 ":memory:")
    pub db_path: String,

    /// 生效中的分配配置
    pub config: AllocationConfig,

    /// 分配引擎 (注册表 + 存储)
    pub engine: Arc<AllocationEngine>,

    /// 分配 API
    pub allocation_api: Arc<AllocationApi>,

    /// 注册表 API (监考员 / 考场 / 名册导入)
    pub registry_api: Arc<RegistryApi>,

    /// 驾驶舱 API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 打开(或创建)指定路径的数据库并初始化应用状态
    pub fn new(db_path: String) -> Result<Self, ApiError> {
        tracing::info!("初始化AppState, 数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("无法打开数据库: {}", e)))?;

        Self::from_connection(db_path, conn, OptionalEventPublisher::none())
    }

    /// 基于内存库初始化 (测试与演示用)
    pub fn in_memory() -> Result<Self, ApiError> {
        let conn = open_in_memory_connection()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("无法打开内存数据库: {}", e)))?;

        Self::from_connection(":memory:".to_string(), conn, OptionalEventPublisher::none())
    }

    /// 打开数据库并挂接事件发布器
    pub fn with_event_publisher(
        db_path: String,
        publisher: Arc<dyn AllocationEventPublisher>,
    ) -> Result<Self, ApiError> {
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("无法打开数据库: {}", e)))?;

        Self::from_connection(db_path, conn, OptionalEventPublisher::with_publisher(publisher))
    }

    fn from_connection(
        db_path: String,
        conn: Connection,
        event_publisher: OptionalEventPublisher,
    ) -> Result<Self, ApiError> {
        ensure_schema(&conn)
            .map_err(|e| ApiError::DatabaseError(format!("schema 初始化失败: {}", e)))?;

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let config = config_manager.load_allocation_config()?;
        config.validate()?;

        // ==========================================
        // 仓储
        // ==========================================
        let invigilator_repo = Arc::new(InvigilatorRepository::new(conn.clone()));
        let venue_repo = Arc::new(VenueRepository::new(conn.clone()));
        let allocation_repo = Arc::new(AllocationRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // ==========================================
        // 回填内存状态
        // ==========================================
        let invigilator_records = invigilator_repo.list_all()?;
        let venue_records = venue_repo.list_all()?;
        let allocation_records = allocation_repo.list_all()?;

        tracing::info!(
            invigilators = invigilator_records.len(),
            venues = venue_records.len(),
            allocations = allocation_records.len(),
            "从数据库回填内存状态"
        );

        let invigilators = Arc::new(InvigilatorRegistry::from_records(invigilator_records));
        let venues = Arc::new(VenueRegistry::from_records(
            venue_records,
            config.max_active_venues,
        ));
        let store = Arc::new(AllocationStore::from_records(allocation_records)?);

        let engine = Arc::new(
            AllocationEngine::new(store, invigilators.clone(), venues.clone(), &config)
                .with_write_through(allocation_repo),
        );

        // ==========================================
        // API
        // ==========================================
        let allocation_api = Arc::new(AllocationApi::new(
            engine.clone(),
            action_log_repo.clone(),
            event_publisher,
            config.clone(),
        ));

        let registry_api = Arc::new(RegistryApi::new(
            invigilators,
            venues,
            invigilator_repo,
            venue_repo,
            action_log_repo.clone(),
        ));

        let dashboard_api = Arc::new(DashboardApi::new(engine.clone(), action_log_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            engine,
            allocation_api,
            registry_api,
            dashboard_api,
            config_manager,
            action_log_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// 优先读取环境变量 `INVIGILATION_APS_DB_PATH`;
/// 否则为 用户数据目录/invigilation-aps/invigilation.db (目录不存在时创建),
/// 取不到数据目录时回退到 ./invigilation.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./invigilation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("invigilation-aps");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("无法创建数据目录 {}: {}", dir.display(), e);
        } else {
            path = dir.join("invigilation.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_in_memory_state_starts_empty_with_default_config() {
        let state = AppState::in_memory().unwrap();

        assert_eq!(state.get_db_path(), ":memory:");
        assert_eq!(state.config, AllocationConfig::default());
        assert!(state.registry_api.list_invigilators().unwrap().is_empty());
        assert!(state.engine.store().snapshot().unwrap().is_empty());
    }
}
