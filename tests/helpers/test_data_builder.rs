// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use class_timetable::domain::{NewTeacher, Student};

// ==========================================
// NewTeacher 构建器
// ==========================================

pub struct TeacherBuilder {
    name: String,
    email: Option<String>,
    department: Option<String>,
    semester_handling: Option<i32>,
    section_handling: Option<String>,
    subjects: Vec<String>,
    max_sessions_per_day: i32,
}

impl TeacherBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: Some(format!("{}@faculty.edu", name.to_lowercase().replace(' ', "."))),
            department: Some("CSE".to_string()),
            semester_handling: None,
            section_handling: None,
            subjects: Vec::new(),
            max_sessions_per_day: 4,
        }
    }

    pub fn semester(mut self, semester: i32) -> Self {
        self.semester_handling = Some(semester);
        self
    }

    pub fn section(mut self, section: &str) -> Self {
        self.section_handling = Some(section.to_string());
        self
    }

    pub fn subjects(mut self, subjects: &[&str]) -> Self {
        self.subjects = subjects.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn max_sessions(mut self, cap: i32) -> Self {
        self.max_sessions_per_day = cap;
        self
    }

    pub fn build(self) -> NewTeacher {
        NewTeacher {
            name: self.name,
            email: self.email,
            department: self.department,
            semester_handling: self.semester_handling,
            section_handling: self.section_handling,
            subjects: self.subjects,
            max_sessions_per_day: self.max_sessions_per_day,
        }
    }
}

// ==========================================
// Student 构建器
// ==========================================

pub struct StudentBuilder {
    usn: String,
    semester: i32,
    section: String,
}

impl StudentBuilder {
    pub fn new(usn: &str) -> Self {
        Self {
            usn: usn.to_string(),
            semester: 3,
            section: "A".to_string(),
        }
    }

    pub fn class(mut self, semester: i32, section: &str) -> Self {
        self.semester = semester;
        self.section = section.to_string();
        self
    }

    pub fn build(self) -> Student {
        Student {
            email: format!("{}@students.edu", self.usn.to_lowercase()),
            name: format!("Student {}", self.usn),
            usn: self.usn,
            department: Some("CSE".to_string()),
            semester: self.semester,
            section: self.section,
        }
    }
}

/// 批量生成学生（学号 {prefix}001 起）
pub fn students(prefix: &str, semester: i32, section: &str, n: usize) -> Vec<Student> {
    (1..=n)
        .map(|i| StudentBuilder::new(&format!("{}{:03}", prefix, i)).class(semester, section).build())
        .collect()
}
