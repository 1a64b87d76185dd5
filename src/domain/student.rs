// ==========================================
// 周课表排课系统 - 学生领域模型
// ==========================================
// 引擎只用于: (a) 确认班级非空 (b) 提供通知收件人
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub usn: String, // 学号
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub semester: i32,
    pub section: String,
}

/// 通知收件人列表（去除空邮箱，保持名册顺序）
pub fn recipient_emails(students: &[Student]) -> Vec<String> {
    students
        .iter()
        .map(|s| s.email.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_emails_skips_blank() {
        let students = vec![
            Student {
                usn: "1JB21CS001".to_string(),
                name: "A".to_string(),
                email: "a@school.edu".to_string(),
                department: None,
                semester: 3,
                section: "A".to_string(),
            },
            Student {
                usn: "1JB21CS002".to_string(),
                name: "B".to_string(),
                email: "  ".to_string(),
                department: None,
                semester: 3,
                section: "A".to_string(),
            },
        ];
        assert_eq!(recipient_emails(&students), vec!["a@school.edu".to_string()]);
    }
}
