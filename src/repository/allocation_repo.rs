// ==========================================
// 监考排班系统 - 分配数据仓储 (SQLite 持久化适配)
// ==========================================
// 说明: 内存 AllocationStore 为权威数据源, 此处只做镜像写入与启动回填
// 红线: 批量写入在单事务内完成
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::types::{AllocationStatus, Weekday};
use crate::engine::persistence::AllocationWriteThrough;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_date, format_datetime, get_date, get_datetime, get_enum};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const INSERT_SQL: &str = r#"
    INSERT INTO allocation (
        allocation_id, invigilator_id, venue_id, date, weekday,
        status, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

const SELECT_SQL: &str = r#"
    SELECT allocation_id, invigilator_id, venue_id, date, weekday,
           status, created_at, updated_at
    FROM allocation
"#;

pub struct AllocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或更新单条分配
    pub fn upsert(&self, allocation: &Allocation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO allocation (
                allocation_id, invigilator_id, venue_id, date, weekday,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(allocation_id) DO UPDATE SET
                status = ?6, updated_at = ?8"#,
            params![
                allocation.allocation_id,
                allocation.invigilator_id,
                allocation.venue_id,
                format_date(&allocation.date),
                allocation.weekday.label(),
                allocation.status.to_db_str(),
                format_datetime(&allocation.created_at),
                format_datetime(&allocation.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 批量插入 (单事务, 任一失败整体回滚)
    pub fn batch_insert(&self, allocations: &[Allocation]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for allocation in allocations {
                stmt.execute(params![
                    allocation.allocation_id,
                    allocation.invigilator_id,
                    allocation.venue_id,
                    format_date(&allocation.date),
                    allocation.weekday.label(),
                    allocation.status.to_db_str(),
                    format_datetime(&allocation.created_at),
                    format_datetime(&allocation.updated_at),
                ])?;
            }
        }

        tx.commit()?;
        Ok(allocations.len())
    }

    /// 更新状态与 updated_at
    ///
    /// # 返回
    /// - `Err(NotFound)`: 库中无此ID
    pub fn update_status(
        &self,
        allocation_id: &str,
        status: AllocationStatus,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE allocation SET status = ?1, updated_at = ?2 WHERE allocation_id = ?3",
            params![status.to_db_str(), format_datetime(&updated_at), allocation_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Allocation".to_string(),
                id: allocation_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, allocation_id: &str) -> RepositoryResult<Option<Allocation>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE allocation_id = ?", SELECT_SQL);
        match conn.query_row(&sql, params![allocation_id], Self::map_row) {
            Ok(allocation) => Ok(Some(allocation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部分配 (插入顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Allocation>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY rowid", SELECT_SQL);
        let mut stmt = conn.prepare(&sql)?;
        let allocations = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(allocations)
    }

    fn map_row(row: &Row) -> rusqlite::Result<Allocation> {
        Ok(Allocation {
            allocation_id: row.get(0)?,
            invigilator_id: row.get(1)?,
            venue_id: row.get(2)?,
            date: get_date(row, 3)?,
            weekday: get_enum(row, 4, Weekday::parse)?,
            status: get_enum(row, 5, AllocationStatus::parse)?,
            created_at: get_datetime(row, 6)?,
            updated_at: get_datetime(row, 7)?,
        })
    }
}

// ==========================================
// 引擎写穿挂钩的 SQLite 实现
// ==========================================
impl AllocationWriteThrough for AllocationRepository {
    fn persist_drafts(&self, drafts: &[Allocation]) -> RepositoryResult<()> {
        self.batch_insert(drafts).map(|_| ())
    }

    fn persist_transition(&self, allocation: &Allocation) -> RepositoryResult<()> {
        self.update_status(
            &allocation.allocation_id,
            allocation.status,
            allocation.updated_at,
        )
    }
}
