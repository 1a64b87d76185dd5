// ==========================================
// 周课表排课系统 - 教师日负荷计数
// ==========================================
// 红线: 每次生成新建，不落库；分配前检查 count < cap
// ==========================================

use crate::domain::SchoolDay;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LoadTracker {
    counts: HashMap<(i64, SchoolDay), u32>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当日已分配课时数
    pub fn count(&self, teacher_id: i64, day: SchoolDay) -> u32 {
        self.counts.get(&(teacher_id, day)).copied().unwrap_or(0)
    }

    pub fn has_capacity(&self, teacher_id: i64, day: SchoolDay, cap: u32) -> bool {
        self.count(teacher_id, day) < cap
    }

    /// 记录一次分配，返回分配后的计数
    pub fn record(&mut self, teacher_id: i64, day: SchoolDay) -> u32 {
        let count = self.counts.entry((teacher_id, day)).or_insert(0);
        *count += 1;
        *count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_per_teacher_and_day() {
        let mut tracker = LoadTracker::new();
        assert!(tracker.has_capacity(1, SchoolDay::Monday, 2));

        tracker.record(1, SchoolDay::Monday);
        assert_eq!(tracker.record(1, SchoolDay::Monday), 2);

        assert!(!tracker.has_capacity(1, SchoolDay::Monday, 2));
        assert!(tracker.has_capacity(1, SchoolDay::Tuesday, 2));
        assert!(tracker.has_capacity(2, SchoolDay::Monday, 2));
        assert!(!tracker.has_capacity(3, SchoolDay::Monday, 0));
    }
}
