// ==========================================
// 周课表排课系统 - 教师领域模型
// ==========================================
// 红线: 科目能力按分隔符精确切分后做集合成员判断，禁止子串匹配
//       （"Math" 不得匹配 "Mathematics"）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 默认科目分隔符
pub const DEFAULT_CAPABILITY_DELIMITER: char = ',';

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub semester_handling: Option<i32>,  // 负责学期
    pub section_handling: Option<String>, // 负责班级
    pub subjects_capable: String,        // 可授科目（分隔符列表，原样保存）
    pub max_sessions_per_day: i32,       // 每日课时上限（<=0 表示使用默认值）
    pub active: bool,
}

impl Teacher {
    /// 可授科目集合
    pub fn capabilities(&self, delimiter: char) -> BTreeSet<String> {
        tokenize_capabilities(&self.subjects_capable, delimiter)
    }

    /// 是否能教授该科目（精确 token 匹配）
    pub fn is_capable_of(&self, subject: &str, delimiter: char) -> bool {
        let subject = subject.trim();
        !subject.is_empty()
            && self
                .subjects_capable
                .split(delimiter)
                .any(|token| token.trim() == subject)
    }

    /// 生效的每日课时上限
    pub fn effective_daily_cap(&self, default_cap: u32) -> u32 {
        if self.max_sessions_per_day > 0 {
            self.max_sessions_per_day as u32
        } else {
            default_cap
        }
    }

    pub fn handles_semester(&self, semester: i32) -> bool {
        self.semester_handling == Some(semester)
    }
}

/// 切分科目列表
///
/// 规则: 按分隔符切分 → 去除首尾空白 → 丢弃空 token → 去重排序
pub fn tokenize_capabilities(raw: &str, delimiter: char) -> BTreeSet<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

// ==========================================
// NewTeacher - 新教师入职参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacher {
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub semester_handling: Option<i32>,
    pub section_handling: Option<String>,
    pub subjects: Vec<String>,
    pub max_sessions_per_day: i32,
}

impl NewTeacher {
    /// 以分隔符拼接科目列表（写库格式）
    pub fn subjects_capable(&self, delimiter: char) -> String {
        self.subjects
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }
}
