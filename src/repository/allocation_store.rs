// ==========================================
// 监考排班系统 - 分配存储 (内存权威数据源)
// ==========================================
// 红线: 冲突检查 (venue_id, date, status) 的唯一事实来源
// 并发: 单一 RwLock, 所有写路径在写锁内完成
// ==========================================
// 职责: 保存全部 Allocation, 提供原子批量追加与按ID读写
// 说明: 只做数据管理, 状态机规则由 LifecycleManager 负责
// 可见性: 可变访问限于 crate 内, 外部只能经引擎改变状态
// ==========================================

use crate::domain::allocation::Allocation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ==========================================
// AllocationTable - 分配表 (锁内数据)
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct AllocationTable {
    rows: Vec<Allocation>,
    positions: HashMap<String, usize>,
}

impl AllocationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按ID查询
    pub fn get(&self, allocation_id: &str) -> Option<&Allocation> {
        self.positions.get(allocation_id).map(|&pos| &self.rows[pos])
    }

    /// 按ID查询 (可变, 仅供生命周期管理器使用)
    pub(crate) fn get_mut(&mut self, allocation_id: &str) -> Option<&mut Allocation> {
        match self.positions.get(allocation_id) {
            Some(&pos) => self.rows.get_mut(pos),
            None => None,
        }
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.rows.iter()
    }

    /// 原子追加一批记录
    ///
    /// # 红线
    /// - 先整体校验ID唯一, 再写入; 失败时表内容不变
    ///
    /// # 返回
    /// - `Ok(count)`: 追加的记录数
    /// - `Err(DuplicateAllocation)`: ID 重复
    pub(crate) fn append(&mut self, batch: Vec<Allocation>) -> RepositoryResult<usize> {
        let mut incoming: HashSet<&str> = HashSet::with_capacity(batch.len());
        for allocation in &batch {
            let id = allocation.allocation_id.as_str();
            if self.positions.contains_key(id) || !incoming.insert(id) {
                return Err(RepositoryError::DuplicateAllocation(format!(
                    "allocation_id={} 已存在",
                    id
                )));
            }
        }

        let count = batch.len();
        for allocation in batch {
            self.positions
                .insert(allocation.allocation_id.clone(), self.rows.len());
            self.rows.push(allocation);
        }
        Ok(count)
    }

    /// 用旧值覆盖同ID记录 (写穿失败时回滚)
    pub(crate) fn restore(&mut self, previous: Allocation) {
        if let Some(&pos) = self.positions.get(&previous.allocation_id) {
            self.rows[pos] = previous;
        }
    }

    /// 截断到指定长度 (撤销最近一次追加)
    pub(crate) fn truncate(&mut self, len: usize) {
        for removed in self.rows.drain(len.min(self.rows.len())..) {
            self.positions.remove(&removed.allocation_id);
        }
    }

    /// 查找占用 (venue_id, date) 的已审批/已发布分配 (排除自身)
    pub fn slot_holder(
        &self,
        venue_id: &str,
        date: NaiveDate,
        excluding_id: &str,
    ) -> Option<&Allocation> {
        self.rows.iter().find(|a| {
            a.allocation_id != excluding_id
                && a.status.holds_slot()
                && a.shares_slot_with(venue_id, date)
        })
    }
}

// ==========================================
// AllocationStore - 分配存储
// ==========================================
/// 对外只读; 状态变更必须经 `AllocationEngine`
///
/// ```compile_fail
/// use invigilation_aps::repository::AllocationStore;
///
/// let store = AllocationStore::new();
/// let _guard = store.write();
/// ```
///
/// ```compile_fail
/// use invigilation_aps::repository::AllocationTable;
///
/// let mut table = AllocationTable::default();
/// let _ = table.get_mut("a1");
/// ```
#[derive(Debug, Default)]
pub struct AllocationStore {
    table: RwLock<AllocationTable>,
}

impl AllocationStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有记录恢复存储 (启动时由持久化层回填)
    pub fn from_records(records: Vec<Allocation>) -> RepositoryResult<Self> {
        let mut table = AllocationTable::default();
        table.append(records)?;
        Ok(Self {
            table: RwLock::new(table),
        })
    }

    /// 获取读锁 (一致性快照)
    pub fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, AllocationTable>> {
        self.table
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 获取写锁 (单写者, 仅引擎写路径使用)
    pub(crate) fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, AllocationTable>> {
        self.table
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 克隆全部记录
    pub fn snapshot(&self) -> RepositoryResult<Vec<Allocation>> {
        Ok(self.read()?.iter().cloned().collect())
    }

    /// 按ID读取
    pub fn find_by_id(&self, allocation_id: &str) -> RepositoryResult<Option<Allocation>> {
        Ok(self.read()?.get(allocation_id).cloned())
    }
}
