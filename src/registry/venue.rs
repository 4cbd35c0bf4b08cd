// ==========================================
// 监考排班系统 - 考场注册表
// ==========================================
// 红线: 启用考场数不超过上限 (默认 20)
// 注册顺序即生成时的轮询顺序
// ==========================================

use crate::domain::types::RecordStatus;
use crate::domain::venue::Venue;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// 默认启用考场上限
pub const DEFAULT_MAX_ACTIVE_VENUES: usize = 20;

/// 新建考场输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub hall_number: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

// ==========================================
// VenueRegistry - 考场注册表
// ==========================================
#[derive(Debug)]
pub struct VenueRegistry {
    venues: RwLock<Vec<Venue>>,
    max_active: usize,
}

impl VenueRegistry {
    pub fn new(max_active: usize) -> Self {
        Self::from_records(Vec::new(), max_active)
    }

    /// 从持久化记录恢复
    ///
    /// 已有数据超过上限时只告警, 不截断; 之后的注册/启用会被拒绝。
    pub fn from_records(venues: Vec<Venue>, max_active: usize) -> Self {
        let active = venues.iter().filter(|v| v.is_active()).count();
        if active > max_active {
            tracing::warn!(active, max_active, "恢复的启用考场数超过上限");
        }
        Self {
            venues: RwLock::new(venues),
            max_active,
        }
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Vec<Venue>>> {
        self.venues
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Vec<Venue>>> {
        self.venues
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    /// 注册考场
    ///
    /// # 错误
    /// - `Validation`: 名称/厅号为空, 或容量为 0
    /// - `CapacityExceeded`: 启用考场数已达上限
    pub fn register(&self, input: NewVenue) -> EngineResult<Venue> {
        let name = input.name.trim();
        let hall_number = input.hall_number.trim();
        if name.is_empty() || hall_number.is_empty() {
            return Err(EngineError::Validation("考场名称和厅号不能为空".to_string()));
        }
        if input.capacity == Some(0) {
            return Err(EngineError::Validation("考场容量必须为正整数".to_string()));
        }

        let mut venues = self.write()?;
        if Self::count_active(&venues) >= self.max_active {
            tracing::warn!(limit = self.max_active, "考场注册被拒绝: 已达上限");
            return Err(EngineError::CapacityExceeded {
                limit: self.max_active,
            });
        }

        let venue = Venue {
            venue_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            hall_number: hall_number.to_string(),
            capacity: input.capacity,
            status: RecordStatus::Active,
        };
        venues.push(venue.clone());
        tracing::info!(venue_id = %venue.venue_id, "考场已注册");
        Ok(venue)
    }

    /// 启用/停用 (重新启用同样受上限约束)
    pub fn set_status(&self, venue_id: &str, status: RecordStatus) -> EngineResult<Venue> {
        let mut venues = self.write()?;
        let active = Self::count_active(&venues);

        let record = venues
            .iter_mut()
            .find(|v| v.venue_id == venue_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Venue",
                id: venue_id.to_string(),
            })?;

        if status.is_active() && !record.is_active() && active >= self.max_active {
            return Err(EngineError::CapacityExceeded {
                limit: self.max_active,
            });
        }
        record.status = status;
        Ok(record.clone())
    }

    pub fn find(&self, venue_id: &str) -> EngineResult<Option<Venue>> {
        Ok(self.read()?.iter().find(|v| v.venue_id == venue_id).cloned())
    }

    /// 全部考场 (注册顺序, 含停用)
    pub fn list(&self) -> EngineResult<Vec<Venue>> {
        Ok(self.read()?.clone())
    }

    /// 启用考场 (注册顺序)
    pub fn active(&self) -> EngineResult<Vec<Venue>> {
        Ok(self.read()?.iter().filter(|v| v.is_active()).cloned().collect())
    }

    pub fn active_count(&self) -> EngineResult<usize> {
        Ok(Self::count_active(&self.read()?))
    }

    /// 按名称/厅号模糊搜索 (不区分大小写)
    pub fn search(&self, term: &str) -> EngineResult<Vec<Venue>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .read()?
            .iter()
            .filter(|v| {
                needle.is_empty()
                    || v.name.to_lowercase().contains(&needle)
                    || v.hall_number.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    /// 启用考场的容量合计 (未填容量按 0 计)
    pub fn total_capacity(&self) -> EngineResult<u64> {
        Ok(self
            .read()?
            .iter()
            .filter(|v| v.is_active())
            .filter_map(|v| v.capacity)
            .map(u64::from)
            .sum())
    }

    fn count_active(venues: &[Venue]) -> usize {
        venues.iter().filter(|v| v.is_active()).count()
    }
}

impl Default for VenueRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE_VENUES)
    }
}
