// ==========================================
// 周课表排课系统 - 通知数据仓储
// ==========================================
// 职责:
// - notification_log: 代课/停课事件日志（随课表同事务写入，见 TimetableRepository）
// - student_notification: 按收件人展开的站内通知
// 红线: 事件日志只追加，不更新不删除
// ==========================================

use crate::domain::ScheduleNotification;
use crate::engine::events::NotificationChannel;
use crate::repository::error::{enum_conversion_error, RepositoryError, RepositoryResult};
use crate::repository::timetable_repo::{parse_datetime, DATETIME_FORMAT};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

const NOTIFICATION_COLUMNS: &str = r#"
    notification_id, run_id, kind, semester, section, day, slot, subject,
    substitute_teacher_id, substitute_teacher_name, message, recipients_json, created_at
"#;

// ==========================================
// NotificationLogRepository - 事件日志（只读查询）
// ==========================================
pub struct NotificationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NotificationLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_run(&self, run_id: &str) -> RepositoryResult<Vec<ScheduleNotification>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM notification_log WHERE run_id = ?1 ORDER BY rowid ASC",
            NOTIFICATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![run_id], map_notification_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 该 (学期, 班级) 的全部事件（按写入顺序）
    pub fn find_by_semester_section(
        &self,
        semester: i32,
        section: &str,
    ) -> RepositoryResult<Vec<ScheduleNotification>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM notification_log WHERE semester = ?1 AND section = ?2 ORDER BY rowid ASC",
            NOTIFICATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![semester, section], map_notification_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_notification_row(row: &Row<'_>) -> SqliteResult<ScheduleNotification> {
    let kind: String = row.get(2)?;
    let day: String = row.get(5)?;
    let recipients_json: String = row.get(11)?;
    let created_at: String = row.get(12)?;

    let recipients: Vec<String> = serde_json::from_str(&recipients_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ScheduleNotification {
        notification_id: row.get(0)?,
        run_id: row.get(1)?,
        kind: kind.parse().map_err(|e| enum_conversion_error(2, e))?,
        semester: row.get(3)?,
        section: row.get(4)?,
        day: day.parse().map_err(|e| enum_conversion_error(5, e))?,
        slot: row.get(6)?,
        subject: row.get(7)?,
        substitute_teacher_id: row.get(8)?,
        substitute_teacher_name: row.get(9)?,
        message: row.get(10)?,
        recipients,
        created_at: parse_datetime(12, &created_at)?,
    })
}

// ==========================================
// StudentNotificationRepository - 站内通知
// ==========================================

/// 站内通知记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentNotificationEntity {
    pub id: i64,
    pub recipient: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

pub struct StudentNotificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentNotificationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 为每个收件人写入一条通知（单事务）
    pub fn insert_for_recipients(&self, message: &str, recipients: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().naive_utc().format(DATETIME_FORMAT).to_string();
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO student_notification (recipient, message, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for recipient in recipients {
                inserted += stmt.execute(params![recipient, message, now])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// 收件人的通知（最新在前）
    pub fn find_by_recipient(&self, recipient: &str) -> RepositoryResult<Vec<StudentNotificationEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, recipient, message, created_at
               FROM student_notification
               WHERE recipient = ?1
               ORDER BY id DESC"#,
        )?;
        let rows = stmt
            .query_map(params![recipient], |row| {
                let created_at: String = row.get(3)?;
                Ok(StudentNotificationEntity {
                    id: row.get(0)?,
                    recipient: row.get(1)?,
                    message: row.get(2)?,
                    created_at: parse_datetime(3, &created_at)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

impl NotificationChannel for StudentNotificationRepository {
    fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.insert_for_recipients(message, recipients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::{NotificationKind, SchoolDay};
    use crate::engine::repositories::TimetableStore;
    use crate::repository::TimetableRepository;

    fn shared_conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_log_is_written_with_entries_and_readable() {
        let conn = shared_conn();
        let timetable = TimetableRepository::new(conn.clone());
        let log = NotificationLogRepository::new(conn);

        let notification = ScheduleNotification {
            notification_id: "n1".to_string(),
            run_id: "r1".to_string(),
            kind: NotificationKind::Substitution,
            semester: 3,
            section: "A".to_string(),
            day: SchoolDay::Tuesday,
            slot: "10:45-11:45".to_string(),
            subject: "Physics".to_string(),
            substitute_teacher_id: Some(7),
            substitute_teacher_name: Some("Ravi".to_string()),
            message: "Ravi substituted for Physics on Tuesday 10:45-11:45".to_string(),
            recipients: vec!["s1@school.edu".to_string(), "s2@school.edu".to_string()],
            created_at: Utc::now().naive_utc(),
        };
        timetable
            .replace_entries(3, "A", &[], std::slice::from_ref(&notification))
            .unwrap();

        let by_run = log.find_by_run("r1").unwrap();
        assert_eq!(by_run.len(), 1);
        assert_eq!(by_run[0].event_key(), notification.event_key());
        assert_eq!(by_run[0].recipients, notification.recipients);
        assert_eq!(log.find_by_semester_section(3, "A").unwrap().len(), 1);
        assert!(log.find_by_semester_section(3, "B").unwrap().is_empty());
    }

    #[test]
    fn test_channel_fans_out_per_recipient() {
        let repo = StudentNotificationRepository::new(shared_conn());
        let recipients = vec!["s1@school.edu".to_string(), "s2@school.edu".to_string()];

        repo.notify("first", &recipients).unwrap();
        repo.notify("second", &recipients[..1]).unwrap();

        let inbox = repo.find_by_recipient("s1@school.edu").unwrap();
        let messages: Vec<&str> = inbox.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(repo.find_by_recipient("s2@school.edu").unwrap().len(), 1);
    }
}
