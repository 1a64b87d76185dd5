// ==========================================
// 周课表排课系统 - 教师数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::{NewTeacher, Teacher};
use crate::engine::repositories::TeacherDirectory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TEACHER_COLUMNS: &str = r#"
    teacher_id, name, email, department,
    semester_handling, section_handling, subjects_capable,
    max_sessions_per_day, active
"#;

// ==========================================
// TeacherRepository - 教师仓储
// ==========================================
pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增教师
    ///
    /// # 返回
    /// - `Ok(teacher_id)`: 自增主键
    pub fn insert(&self, teacher: &NewTeacher, delimiter: char) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO teacher (
                name, email, department,
                semester_handling, section_handling, subjects_capable,
                max_sessions_per_day, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
            "#,
            params![
                teacher.name.trim(),
                teacher.email,
                teacher.department,
                teacher.semester_handling,
                teacher.section_handling,
                teacher.subjects_capable(delimiter),
                teacher.max_sessions_per_day,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 启用/停用教师
    pub fn set_active(&self, teacher_id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE teacher SET active = ?1 WHERE teacher_id = ?2",
            params![active, teacher_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "teacher".to_string(),
                id: teacher_id.to_string(),
            });
        }
        Ok(())
    }

    fn query_list(&self, where_clause: &str, params: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM teacher {} ORDER BY teacher_id ASC",
            TEACHER_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let teachers = stmt
            .query_map(params, map_teacher_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(teachers)
    }
}

impl TeacherDirectory for TeacherRepository {
    fn list_by_semester(&self, semester: i32) -> RepositoryResult<Vec<Teacher>> {
        self.query_list(
            "WHERE semester_handling = ?1",
            &[&semester as &dyn rusqlite::ToSql],
        )
    }

    fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM teacher WHERE name = ?1 ORDER BY teacher_id ASC LIMIT 1",
            TEACHER_COLUMNS
        );
        let teacher = conn
            .query_row(&sql, params![name.trim()], map_teacher_row)
            .optional()?;
        Ok(teacher)
    }

    fn find_by_id(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM teacher WHERE teacher_id = ?1", TEACHER_COLUMNS);
        let teacher = conn
            .query_row(&sql, params![teacher_id], map_teacher_row)
            .optional()?;
        Ok(teacher)
    }

    fn all(&self) -> RepositoryResult<Vec<Teacher>> {
        self.query_list("", &[])
    }
}

fn map_teacher_row(row: &Row<'_>) -> SqliteResult<Teacher> {
    Ok(Teacher {
        teacher_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
        semester_handling: row.get(4)?,
        section_handling: row.get(5)?,
        subjects_capable: row.get(6)?,
        max_sessions_per_day: row.get(7)?,
        active: row.get(8)?,
    })
}
