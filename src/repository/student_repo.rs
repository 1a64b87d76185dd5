// ==========================================
// 周课表排课系统 - 学生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::Student;
use crate::engine::repositories::StudentDirectory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或更新学生（按学号 UPSERT）
    pub fn upsert(&self, student: &Student) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO student (usn, name, email, department, semester, section)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(usn) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                department = excluded.department,
                semester = excluded.semester,
                section = excluded.section
            "#,
            params![
                student.usn,
                student.name,
                student.email,
                student.department,
                student.semester,
                student.section,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_usn(&self, usn: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                r#"SELECT usn, name, email, department, semester, section
                   FROM student WHERE usn = ?1"#,
                params![usn],
                map_student_row,
            )
            .optional()?;
        Ok(student)
    }
}

impl StudentDirectory for StudentRepository {
    fn list_by_semester_section(&self, semester: i32, section: &str) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT usn, name, email, department, semester, section
               FROM student
               WHERE semester = ?1 AND section = ?2
               ORDER BY usn ASC"#,
        )?;
        let students = stmt
            .query_map(params![semester, section], map_student_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }
}

fn map_student_row(row: &Row<'_>) -> SqliteResult<Student> {
    Ok(Student {
        usn: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
        semester: row.get(4)?,
        section: row.get(5)?,
    })
}
