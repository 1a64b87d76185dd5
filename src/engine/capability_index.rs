// ==========================================
// 周课表排课系统 - 科目能力索引
// ==========================================
// 职责: 每次生成构建一次，给出学期科目集合与各科目的候选教师池
// 红线: 科目匹配为分词后的精确匹配（"Math" 不匹配 "Mathematics"）
// ==========================================

use crate::domain::Teacher;
use std::collections::{BTreeMap, BTreeSet};

/// 科目能力索引
///
/// - 科目集合: 负责该学期的在职教师的能力标签并集（字典序）
/// - 候选池: 全体在职教师中能力集合包含该科目者（teacher_id 升序）
#[derive(Debug, Clone)]
pub struct CapabilityIndex {
    subjects: Vec<String>,
    pools: BTreeMap<String, Vec<Teacher>>,
}

impl CapabilityIndex {
    /// 构建索引
    ///
    /// # 参数
    /// - `semester`: 学期
    /// - `roster`: 全体教师（任意顺序）
    /// - `delimiter`: 能力标签分隔符
    pub fn build(semester: i32, roster: &[Teacher], delimiter: char) -> Self {
        let mut active: Vec<&Teacher> = roster.iter().filter(|t| t.active).collect();
        active.sort_by_key(|t| t.teacher_id);

        let subjects: BTreeSet<String> = active
            .iter()
            .filter(|t| t.handles_semester(semester))
            .flat_map(|t| t.capabilities(delimiter))
            .collect();

        let mut pools = BTreeMap::new();
        for subject in &subjects {
            let pool: Vec<Teacher> = active
                .iter()
                .filter(|t| t.is_capable_of(subject, delimiter))
                .map(|t| (*t).clone())
                .collect();
            pools.insert(subject.clone(), pool);
        }

        Self {
            subjects: subjects.into_iter().collect(),
            pools,
        }
    }

    /// 科目（确定顺序）
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// 科目的候选教师池（未洗牌）
    pub fn pool(&self, subject: &str) -> &[Teacher] {
        self.pools.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(id: i64, semester: Option<i32>, subjects: &str, active: bool) -> Teacher {
        Teacher {
            teacher_id: id,
            name: format!("T{}", id),
            email: None,
            department: None,
            semester_handling: semester,
            section_handling: None,
            subjects_capable: subjects.to_string(),
            max_sessions_per_day: 4,
            active,
        }
    }

    #[test]
    fn test_subjects_come_from_semester_teachers_only() {
        let roster = vec![
            teacher(1, Some(3), "Physics, Math", true),
            teacher(2, Some(5), "Chemistry", true),
            teacher(3, Some(3), "Biology", false),
        ];
        let index = CapabilityIndex::build(3, &roster, ',');
        assert_eq!(index.subjects(), &["Math".to_string(), "Physics".to_string()]);
    }

    #[test]
    fn test_pool_spans_full_roster_in_id_order() {
        let roster = vec![
            teacher(9, Some(5), "Math", true),
            teacher(4, Some(3), "Math", true),
            teacher(6, None, "Math,Art", true),
            teacher(7, Some(3), "Math", false),
        ];
        let index = CapabilityIndex::build(3, &roster, ',');
        let ids: Vec<i64> = index.pool("Math").iter().map(|t| t.teacher_id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
        // Art 仅来自未负责本学期的教师，不进入科目集合
        assert!(!index.subjects().contains(&"Art".to_string()));
    }

    #[test]
    fn test_exact_token_matching() {
        let roster = vec![
            teacher(1, Some(3), "Math", true),
            teacher(2, Some(3), "Mathematics", true),
        ];
        let index = CapabilityIndex::build(3, &roster, ',');
        let math: Vec<i64> = index.pool("Math").iter().map(|t| t.teacher_id).collect();
        let maths: Vec<i64> = index.pool("Mathematics").iter().map(|t| t.teacher_id).collect();
        assert_eq!(math, vec![1]);
        assert_eq!(maths, vec![2]);
        assert!(index.pool("Physics").is_empty());
    }
}
