// ==========================================
// 监考排班系统 - 监考员数据仓储
// ==========================================
// 存储: invigilator 表, availability 列为星期标签 JSON 数组
// 红线: Repository 不含业务逻辑, 校验在注册表完成
// ==========================================

use crate::domain::invigilator::Invigilator;
use crate::domain::types::{RecordStatus, Weekday};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_datetime, get_datetime, get_enum};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct InvigilatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InvigilatorRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或更新 (保持原插入顺序)
    pub fn upsert(&self, invigilator: &Invigilator) -> RepositoryResult<()> {
        let availability = serde_json::to_string(&invigilator.availability)
            .map_err(|e| RepositoryError::FieldValueError {
                field: "availability".to_string(),
                message: e.to_string(),
            })?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO invigilator (
                invigilator_id, name, email, phone, availability, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(invigilator_id) DO UPDATE SET
                name = ?2, email = ?3, phone = ?4, availability = ?5, status = ?6"#,
            params![
                invigilator.invigilator_id,
                invigilator.name,
                invigilator.email,
                invigilator.phone,
                availability,
                invigilator.status.to_db_str(),
                format_datetime(&invigilator.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, invigilator_id: &str) -> RepositoryResult<Option<Invigilator>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT invigilator_id, name, email, phone, availability, status, created_at
               FROM invigilator WHERE invigilator_id = ?"#,
            params![invigilator_id],
            Self::map_row,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部监考员 (插入顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Invigilator>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT invigilator_id, name, email, phone, availability, status, created_at
               FROM invigilator ORDER BY rowid"#,
        )?;
        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn map_row(row: &Row) -> rusqlite::Result<Invigilator> {
        let raw: String = row.get(4)?;
        let availability: BTreeSet<Weekday> = serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(Invigilator {
            invigilator_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            availability,
            status: get_enum(row, 5, RecordStatus::parse)?,
            created_at: get_datetime(row, 6)?,
        })
    }
}
