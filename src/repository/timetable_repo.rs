// ==========================================
// 周课表排课系统 - 课表数据仓储
// ==========================================
// 红线:
// - 生成结果整体替换同键草稿，必须在单个事务中完成
// - 发布为原子动作，不可观察到部分发布状态
// ==========================================

use crate::domain::{ScheduleNotification, TimetableEntry};
use crate::engine::repositories::TimetableStore;
use crate::repository::error::{enum_conversion_error, RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// TimetableRepository - 课表仓储
// ==========================================
pub struct TimetableRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimetableRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按发布状态查询
    pub fn find_by_published(
        &self,
        semester: i32,
        section: &str,
        published: bool,
    ) -> RepositoryResult<Vec<TimetableEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT entry_id, run_id, semester, section, day, slot, seq_no,
                      subject, teacher_id, entry_kind, published, created_at, published_at
               FROM timetable_entry
               WHERE semester = ?1 AND section = ?2 AND published = ?3
               ORDER BY seq_no ASC"#,
        )?;
        let entries = stmt
            .query_map(params![semester, section, published], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// 按生成批次查询
    pub fn find_by_run(&self, run_id: &str) -> RepositoryResult<Vec<TimetableEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT entry_id, run_id, semester, section, day, slot, seq_no,
                      subject, teacher_id, entry_kind, published, created_at, published_at
               FROM timetable_entry
               WHERE run_id = ?1
               ORDER BY seq_no ASC"#,
        )?;
        let entries = stmt
            .query_map(params![run_id], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }
}

impl TimetableStore for TimetableRepository {
    fn replace_entries(
        &self,
        semester: i32,
        section: &str,
        entries: &[TimetableEntry],
        notifications: &[ScheduleNotification],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM timetable_entry WHERE semester = ?1 AND section = ?2 AND published = 0",
            params![semester, section],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO timetable_entry (
                        entry_id, run_id, semester, section, day, slot, seq_no,
                        subject, teacher_id, entry_kind, published, created_at, published_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, NULL)"#,
            )?;

            for entry in entries {
                if entry.semester != semester || entry.section != section {
                    return Err(RepositoryError::ValidationError(format!(
                        "条目 {} 不属于 semester={}, section={}",
                        entry.entry_id, semester, section
                    )));
                }
                stmt.execute(params![
                    entry.entry_id,
                    entry.run_id,
                    entry.semester,
                    entry.section,
                    entry.day.as_str(),
                    entry.slot,
                    entry.seq_no,
                    entry.subject,
                    entry.teacher_id,
                    entry.kind.to_db_str(),
                    entry.created_at.format(DATETIME_FORMAT).to_string(),
                ])?;
            }
        }

        insert_notifications(&tx, notifications)?;

        tx.commit()?;

        tracing::debug!(
            semester,
            section,
            removed_drafts = removed,
            inserted = entries.len(),
            notifications = notifications.len(),
            "课表草稿已替换"
        );
        Ok(entries.len())
    }

    fn find_by_semester_section(&self, semester: i32, section: &str) -> RepositoryResult<Vec<TimetableEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT entry_id, run_id, semester, section, day, slot, seq_no,
                      subject, teacher_id, entry_kind, published, created_at, published_at
               FROM timetable_entry
               WHERE semester = ?1 AND section = ?2
               ORDER BY published ASC, seq_no ASC"#,
        )?;
        let entries = stmt
            .query_map(params![semester, section], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    fn mark_published(&self, semester: i32, section: &str) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let (total, drafts): (i64, i64) = tx.query_row(
            r#"SELECT COUNT(*), COALESCE(SUM(CASE WHEN published = 0 THEN 1 ELSE 0 END), 0)
               FROM timetable_entry
               WHERE semester = ?1 AND section = ?2"#,
            params![semester, section],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if total == 0 {
            return Err(RepositoryError::NotFound {
                entity: "timetable_entry".to_string(),
                id: format!("semester={}, section={}", semester, section),
            });
        }

        if drafts > 0 {
            // 新草稿取代旧的已发布课表
            tx.execute(
                "DELETE FROM timetable_entry WHERE semester = ?1 AND section = ?2 AND published = 1",
                params![semester, section],
            )?;
            tx.execute(
                r#"UPDATE timetable_entry SET published = 1, published_at = ?3
                   WHERE semester = ?1 AND section = ?2 AND published = 0"#,
                params![
                    semester,
                    section,
                    Utc::now().naive_utc().format(DATETIME_FORMAT).to_string()
                ],
            )?;
        }

        let published: i64 = tx.query_row(
            "SELECT COUNT(*) FROM timetable_entry WHERE semester = ?1 AND section = ?2 AND published = 1",
            params![semester, section],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(published as usize)
    }
}

/// 在调用方事务内追加事件日志
fn insert_notifications(tx: &Transaction<'_>, notifications: &[ScheduleNotification]) -> RepositoryResult<()> {
    if notifications.is_empty() {
        return Ok(());
    }

    let mut stmt = tx.prepare(
        r#"INSERT INTO notification_log (
                notification_id, run_id, kind, semester, section, day, slot, subject,
                substitute_teacher_id, substitute_teacher_name, message, recipients_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
    )?;

    for n in notifications {
        let recipients_json = serde_json::to_string(&n.recipients)?;
        stmt.execute(params![
            n.notification_id,
            n.run_id,
            n.kind.to_db_str(),
            n.semester,
            n.section,
            n.day.as_str(),
            n.slot,
            n.subject,
            n.substitute_teacher_id,
            n.substitute_teacher_name,
            n.message,
            recipients_json,
            n.created_at.format(DATETIME_FORMAT).to_string(),
        ])?;
    }
    Ok(())
}

pub(crate) fn parse_datetime(column: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_entry_row(row: &Row<'_>) -> SqliteResult<TimetableEntry> {
    let day: String = row.get(4)?;
    let kind: String = row.get(9)?;
    let created_at: String = row.get(11)?;
    let published_at: Option<String> = row.get(12)?;

    Ok(TimetableEntry {
        entry_id: row.get(0)?,
        run_id: row.get(1)?,
        semester: row.get(2)?,
        section: row.get(3)?,
        day: day.parse().map_err(|e| enum_conversion_error(4, e))?,
        slot: row.get(5)?,
        seq_no: row.get(6)?,
        subject: row.get(7)?,
        teacher_id: row.get(8)?,
        kind: kind.parse().map_err(|e| enum_conversion_error(9, e))?,
        published: row.get(10)?,
        created_at: parse_datetime(11, &created_at)?,
        published_at: published_at
            .as_deref()
            .map(|s| parse_datetime(12, s))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::{EntryKind, NotificationKind, SchoolDay};

    fn setup() -> TimetableRepository {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        // 条目 teacher_id 受外键约束
        conn.execute("INSERT INTO teacher (teacher_id, name) VALUES (1, 'Asha')", [])
            .unwrap();
        TimetableRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn entry(run_id: &str, seq_no: i32, slot: &str, subject: &str) -> TimetableEntry {
        TimetableEntry {
            entry_id: format!("{}-{}", run_id, seq_no),
            run_id: run_id.to_string(),
            semester: 3,
            section: "A".to_string(),
            day: SchoolDay::Monday,
            slot: slot.to_string(),
            seq_no,
            subject: subject.to_string(),
            teacher_id: 1,
            kind: EntryKind::Matched,
            published: false,
            created_at: Utc::now().naive_utc(),
            published_at: None,
        }
    }

    fn cancellation(run_id: &str) -> ScheduleNotification {
        ScheduleNotification {
            notification_id: format!("{}-n1", run_id),
            run_id: run_id.to_string(),
            kind: NotificationKind::Cancellation,
            semester: 3,
            section: "A".to_string(),
            day: SchoolDay::Monday,
            slot: "11:45-12:45".to_string(),
            subject: "Art".to_string(),
            substitute_teacher_id: None,
            substitute_teacher_name: None,
            message: "cancelled".to_string(),
            recipients: vec!["s1@school.edu".to_string()],
            created_at: Utc::now().naive_utc(),
        }
    }

    fn count_notifications(repo: &TimetableRepository) -> i64 {
        let conn = repo.get_conn().unwrap();
        conn.query_row("SELECT COUNT(*) FROM notification_log", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_replace_entries_overwrites_drafts() {
        let repo = setup();
        repo.replace_entries(3, "A", &[entry("r1", 0, "9:30-10:30", "Math")], &[])
            .unwrap();
        repo.replace_entries(
            3,
            "A",
            &[entry("r2", 0, "9:30-10:30", "Math"), entry("r2", 1, "10:45-11:45", "Physics")],
            &[cancellation("r2")],
        )
        .unwrap();

        let stored = repo.find_by_semester_section(3, "A").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| e.run_id == "r2" && !e.published));
        assert_eq!(stored[1].subject, "Physics");
        assert_eq!(count_notifications(&repo), 1);
    }

    #[test]
    fn test_replace_entries_rolls_back_on_mismatched_key() {
        let repo = setup();
        repo.replace_entries(3, "A", &[entry("r1", 0, "9:30-10:30", "Math")], &[])
            .unwrap();

        let mut foreign = entry("r2", 0, "9:30-10:30", "Math");
        foreign.section = "B".to_string();
        let result = repo.replace_entries(3, "A", &[foreign], &[cancellation("r2")]);
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));

        let stored = repo.find_by_semester_section(3, "A").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].run_id, "r1");
        assert_eq!(count_notifications(&repo), 0);
    }

    #[test]
    fn test_mark_published_unknown_key() {
        let repo = setup();
        let err = repo.mark_published(3, "Z").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_mark_published_retires_previous_publication() {
        let repo = setup();
        repo.replace_entries(3, "A", &[entry("r1", 0, "9:30-10:30", "Math")], &[])
            .unwrap();
        assert_eq!(repo.mark_published(3, "A").unwrap(), 1);

        repo.replace_entries(
            3,
            "A",
            &[entry("r2", 0, "9:30-10:30", "Math"), entry("r2", 1, "10:45-11:45", "Physics")],
            &[],
        )
        .unwrap();
        // 草稿与已发布共存
        assert_eq!(repo.find_by_semester_section(3, "A").unwrap().len(), 3);
        assert_eq!(repo.find_by_published(3, "A", true).unwrap()[0].run_id, "r1");

        assert_eq!(repo.mark_published(3, "A").unwrap(), 2);
        let stored = repo.find_by_semester_section(3, "A").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| e.published && e.run_id == "r2"));
        assert!(stored.iter().all(|e| e.published_at.is_some()));

        // 无新草稿时重复发布不改变状态
        assert_eq!(repo.mark_published(3, "A").unwrap(), 2);
        assert!(repo.find_by_run("r1").unwrap().is_empty());
    }
}
