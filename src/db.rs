// ==========================================
// 周课表排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 提供幂等的建表入口，CLI 与集成测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表说明：
/// - teacher / student: 名册（引擎只读）
/// - teacher_availability: 空闲记录；无记录即视为空闲
/// - timetable_entry: 课表条目（草稿/已发布）
/// - notification_log: 每次生成的代课/停课事件日志
/// - student_notification: 按收件人落库的通知
/// - config_scope / config_kv: 配置
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS teacher (
            teacher_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            department TEXT,
            semester_handling INTEGER,
            section_handling TEXT,
            subjects_capable TEXT NOT NULL DEFAULT '',
            max_sessions_per_day INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_teacher_name ON teacher(name);
        CREATE INDEX IF NOT EXISTS idx_teacher_semester ON teacher(semester_handling);

        CREATE TABLE IF NOT EXISTS student (
            usn TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            department TEXT,
            semester INTEGER NOT NULL,
            section TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_student_sem_section ON student(semester, section);

        -- subject 为空串表示“不区分科目”的记录（主键列不允许依赖 NULL 语义）
        CREATE TABLE IF NOT EXISTS teacher_availability (
            teacher_id INTEGER NOT NULL REFERENCES teacher(teacher_id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            slot TEXT NOT NULL,
            subject TEXT NOT NULL DEFAULT '',
            available INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (teacher_id, day, slot, subject)
        );

        CREATE TABLE IF NOT EXISTS timetable_entry (
            entry_id TEXT PRIMARY KEY,
            run_id TEXT NOT NULL,
            semester INTEGER NOT NULL,
            section TEXT NOT NULL,
            day TEXT NOT NULL,
            slot TEXT NOT NULL,
            seq_no INTEGER NOT NULL,
            subject TEXT NOT NULL,
            teacher_id INTEGER NOT NULL REFERENCES teacher(teacher_id),
            entry_kind TEXT NOT NULL,
            published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            published_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_timetable_key ON timetable_entry(semester, section, published);

        CREATE TABLE IF NOT EXISTS notification_log (
            notification_id TEXT PRIMARY KEY,
            run_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            semester INTEGER NOT NULL,
            section TEXT NOT NULL,
            day TEXT NOT NULL,
            slot TEXT NOT NULL,
            subject TEXT NOT NULL,
            substitute_teacher_id INTEGER,
            substitute_teacher_name TEXT,
            message TEXT NOT NULL,
            recipients_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notification_run ON notification_log(run_id);
        CREATE INDEX IF NOT EXISTS idx_notification_key ON notification_log(semester, section);

        CREATE TABLE IF NOT EXISTS student_notification (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_student_notification_recipient ON student_notification(recipient);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_absent_on_empty_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let global_scopes: i64 = conn
            .query_row("SELECT COUNT(*) FROM config_scope WHERE scope_id = 'global'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(global_scopes, 1);
    }
}
