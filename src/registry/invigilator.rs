// ==========================================
// 监考排班系统 - 监考员注册表
// ==========================================
// 红线: 只停用, 不删除; 可用日至少一天
// 并发: RwLock<Vec<Invigilator>>, 生成时整体克隆快照
// ==========================================

use crate::domain::invigilator::Invigilator;
use crate::domain::types::{RecordStatus, Weekday};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::error::RepositoryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// 新建监考员输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewInvigilator {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub availability: Vec<Weekday>,
}

// ==========================================
// InvigilatorRegistry - 监考员注册表
// ==========================================
#[derive(Debug, Default)]
pub struct InvigilatorRegistry {
    records: RwLock<Vec<Invigilator>>,
}

impl InvigilatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从持久化记录恢复
    pub fn from_records(records: Vec<Invigilator>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Vec<Invigilator>>> {
        self.records
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Vec<Invigilator>>> {
        self.records
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    /// 注册监考员
    ///
    /// # 错误
    /// - `Validation`: 姓名/邮箱为空, 或未选择可用日
    pub fn register(&self, input: NewInvigilator, now: NaiveDateTime) -> EngineResult<Invigilator> {
        let name = input.name.trim();
        let email = input.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(EngineError::Validation("姓名和邮箱不能为空".to_string()));
        }
        let availability = Self::check_availability(&input.availability)?;

        let invigilator = Invigilator {
            invigilator_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: input.phone.trim().to_string(),
            availability,
            status: RecordStatus::Active,
            created_at: now,
        };

        self.write()?.push(invigilator.clone());
        tracing::info!(invigilator_id = %invigilator.invigilator_id, "监考员已注册");
        Ok(invigilator)
    }

    /// 更新可用日 (整体替换)
    pub fn update_availability(
        &self,
        invigilator_id: &str,
        days: &[Weekday],
    ) -> EngineResult<Invigilator> {
        let availability = Self::check_availability(days)?;
        let mut records = self.write()?;
        let record = Self::locate(&mut records, invigilator_id)?;
        record.availability = availability;
        Ok(record.clone())
    }

    /// 启用/停用
    pub fn set_status(&self, invigilator_id: &str, status: RecordStatus) -> EngineResult<Invigilator> {
        let mut records = self.write()?;
        let record = Self::locate(&mut records, invigilator_id)?;
        record.status = status;
        Ok(record.clone())
    }

    pub fn find(&self, invigilator_id: &str) -> EngineResult<Option<Invigilator>> {
        Ok(self
            .read()?
            .iter()
            .find(|i| i.invigilator_id == invigilator_id)
            .cloned())
    }

    /// 全部监考员 (注册顺序, 含停用)
    pub fn list(&self) -> EngineResult<Vec<Invigilator>> {
        Ok(self.read()?.clone())
    }

    /// 按姓名/邮箱模糊搜索 (不区分大小写)
    pub fn search(&self, term: &str) -> EngineResult<Vec<Invigilator>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .read()?
            .iter()
            .filter(|i| {
                needle.is_empty()
                    || i.name.to_lowercase().contains(&needle)
                    || i.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    pub fn active_count(&self) -> EngineResult<usize> {
        Ok(self.read()?.iter().filter(|i| i.is_active()).count())
    }

    fn check_availability(days: &[Weekday]) -> EngineResult<BTreeSet<Weekday>> {
        if days.is_empty() {
            return Err(EngineError::Validation("至少选择一个可用日".to_string()));
        }
        Ok(days.iter().copied().collect())
    }

    fn locate<'a>(
        records: &'a mut [Invigilator],
        invigilator_id: &str,
    ) -> EngineResult<&'a mut Invigilator> {
        records
            .iter_mut()
            .find(|i| i.invigilator_id == invigilator_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Invigilator",
                id: invigilator_id.to_string(),
            })
    }
}
