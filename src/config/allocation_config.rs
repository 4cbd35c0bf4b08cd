// ==========================================
// 监考排班系统 - 分配配置
// ==========================================

use crate::engine::generator::DEFAULT_WINDOW_DAYS;
use crate::registry::venue::DEFAULT_MAX_ACTIVE_VENUES;
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::{Deserialize, Serialize};

/// 默认最大窗口天数
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 62;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 未指定窗口时的默认天数
    pub default_window_days: u32,
    /// 单次生成的最大窗口天数
    pub max_window_days: u32,
    /// 启用考场上限
    pub max_active_venues: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            default_window_days: DEFAULT_WINDOW_DAYS,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            max_active_venues: DEFAULT_MAX_ACTIVE_VENUES,
        }
    }
}

impl AllocationConfig {
    /// 配置项之间的一致性校验
    pub fn validate(&self) -> RepositoryResult<()> {
        if self.max_window_days == 0 {
            return Err(RepositoryError::FieldValueError {
                field: "max_window_days".to_string(),
                message: "必须大于0".to_string(),
            });
        }
        if self.default_window_days == 0 || self.default_window_days > self.max_window_days {
            return Err(RepositoryError::FieldValueError {
                field: "default_window_days".to_string(),
                message: format!("必须在1-{}之间", self.max_window_days),
            });
        }
        if self.max_active_venues == 0 {
            return Err(RepositoryError::FieldValueError {
                field: "max_active_venues".to_string(),
                message: "必须大于0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AllocationConfig::default();
        assert_eq!(config.default_window_days, 7);
        assert_eq!(config.max_window_days, 62);
        assert_eq!(config.max_active_venues, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_window_beyond_max_is_rejected() {
        let config = AllocationConfig {
            default_window_days: 30,
            max_window_days: 14,
            ..AllocationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }
}
