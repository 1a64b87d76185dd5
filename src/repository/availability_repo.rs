// ==========================================
// 周课表排课系统 - 教师空闲数据仓储
// ==========================================
// 红线: is_available 为纯读，缺省视为空闲，查询中不得补建记录
// 说明: 默认记录只在教师入职时经 provision_defaults 显式预置
// ==========================================

use crate::domain::{AvailabilityRecord, SchoolDay, SlotGrid};
use crate::engine::repositories::AvailabilityStore;
use crate::repository::error::{enum_conversion_error, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct AvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 预置默认空闲记录（入职时调用一次）
    ///
    /// 对网格内每个 (教学日, 教学课时) 写入 available=1；已存在的记录保持不变。
    ///
    /// # 返回
    /// - `Ok(count)`: 新写入的记录数
    pub fn provision_defaults(&self, teacher_id: i64, grid: &SlotGrid) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                r#"INSERT OR IGNORE INTO teacher_availability (teacher_id, day, slot, subject, available)
                   VALUES (?1, ?2, ?3, '', 1)"#,
            )?;
            for day in grid.days() {
                for slot in grid.teaching_slots() {
                    inserted += stmt.execute(params![teacher_id, day.as_str(), slot.label])?;
                }
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// 设置空闲状态（UPSERT）
    pub fn set_availability(&self, record: &AvailabilityRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO teacher_availability (teacher_id, day, slot, subject, available)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(teacher_id, day, slot, subject) DO UPDATE SET available = excluded.available
            "#,
            params![
                record.teacher_id,
                record.day.as_str(),
                record.slot,
                record.subject.as_deref().unwrap_or(""),
                record.available,
            ],
        )?;
        Ok(())
    }

    /// 教师的全部空闲记录
    pub fn find_by_teacher(&self, teacher_id: i64) -> RepositoryResult<Vec<AvailabilityRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT teacher_id, day, slot, subject, available
               FROM teacher_availability
               WHERE teacher_id = ?1
               ORDER BY day, slot, subject"#,
        )?;
        let records = stmt
            .query_map(params![teacher_id], |row| {
                let day: String = row.get(1)?;
                let subject: String = row.get(3)?;
                Ok(AvailabilityRecord {
                    teacher_id: row.get(0)?,
                    day: day.parse().map_err(|e| enum_conversion_error(1, e))?,
                    slot: row.get(2)?,
                    subject: if subject.is_empty() { None } else { Some(subject) },
                    available: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 记录总数（用于校验查询无副作用）
    pub fn count_records(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM teacher_availability", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl AvailabilityStore for AvailabilityRepository {
    fn is_available(&self, teacher_id: i64, day: SchoolDay, slot: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let blocked: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM teacher_availability
               WHERE teacher_id = ?1 AND day = ?2 AND slot = ?3 AND available = 0"#,
            params![teacher_id, day.as_str(), slot],
            |row| row.get(0),
        )?;
        Ok(blocked == 0)
    }
}
