// ==========================================
// 监考排班系统 - 考场数据仓储
// ==========================================
// 存储: venue 表; 读取顺序 = 注册顺序 (rowid)
// ==========================================

use crate::domain::types::RecordStatus;
use crate::domain::venue::Venue;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::get_enum;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct VenueRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VenueRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn upsert(&self, venue: &Venue) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO venue (venue_id, name, hall_number, capacity, status)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(venue_id) DO UPDATE SET
                   name = ?2, hall_number = ?3, capacity = ?4, status = ?5"#,
            params![
                venue.venue_id,
                venue.name,
                venue.hall_number,
                venue.capacity,
                venue.status.to_db_str(),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, venue_id: &str) -> RepositoryResult<Option<Venue>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            "SELECT venue_id, name, hall_number, capacity, status FROM venue WHERE venue_id = ?",
            params![venue_id],
            Self::map_row,
        ) {
            Ok(venue) => Ok(Some(venue)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部考场 (注册顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Venue>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT venue_id, name, hall_number, capacity, status FROM venue ORDER BY rowid",
        )?;
        let venues = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(venues)
    }

    fn map_row(row: &Row) -> rusqlite::Result<Venue> {
        Ok(Venue {
            venue_id: row.get(0)?,
            name: row.get(1)?,
            hall_number: row.get(2)?,
            capacity: row.get(3)?,
            status: get_enum(row, 4, RecordStatus::parse)?,
        })
    }
}
