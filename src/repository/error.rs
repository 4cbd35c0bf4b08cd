// ==========================================
// 监考排班系统 - 仓储层错误类型
// ==========================================
// 覆盖: 内存存储 (锁) + SQLite 镜像 (约束/查询)
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// ux_allocation_slot_held 触发时报告的约束列
const SLOT_INDEX_COLUMNS: &str = "allocation.venue_id, allocation.date";

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    /// 内存存储或连接的锁已中毒
    #[error("锁获取失败: {0}")]
    LockError(String),

    /// 同一 (venue, date) 已有占位记录 (库内部分唯一索引)
    #[error("考场占用已存在: {0}")]
    SlotAlreadyHeld(String),

    /// 追加的分配ID与已有记录重复
    #[error("分配ID重复: {0}")]
    DuplicateAllocation(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    /// 持久化字段无法解析或配置值非法
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains(SLOT_INDEX_COLUMNS) {
                    RepositoryError::SlotAlreadyHeld(msg)
                } else if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
