// ==========================================
// 周课表排课系统 - 课时网格
// ==========================================
// 职责: 定义教学日与课时的固定顺序，区分教学课时与课间/午休
// 红线: 班主任课时 = 每日第一个教学课时
// ==========================================

use crate::domain::types::{SchoolDay, SlotKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 单个课时
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub label: String,
    pub kind: SlotKind,
}

impl TimeSlot {
    pub fn teaching(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: SlotKind::Teaching,
        }
    }

    pub fn non_teaching(label: &str, kind: SlotKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
        }
    }

    pub fn is_teaching(&self) -> bool {
        self.kind.is_teaching()
    }
}

/// 课时网格（天 × 课时）
///
/// 所有教学日共用同一课时序列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    days: Vec<SchoolDay>,
    slots: Vec<TimeSlot>,
}

impl SlotGrid {
    /// 创建并校验网格
    ///
    /// # 校验
    /// - 至少一个教学日，且不重复
    /// - 课时标签非空且不重复
    /// - 至少一个教学课时
    pub fn new(days: Vec<SchoolDay>, slots: Vec<TimeSlot>) -> Result<Self, String> {
        if days.is_empty() {
            return Err("课时网格至少需要一个教学日".to_string());
        }
        let mut seen_days = HashSet::new();
        for day in &days {
            if !seen_days.insert(*day) {
                return Err(format!("教学日重复: {}", day));
            }
        }

        let mut seen_labels = HashSet::new();
        for slot in &slots {
            if slot.label.trim().is_empty() {
                return Err("课时标签不能为空".to_string());
            }
            if !seen_labels.insert(slot.label.as_str()) {
                return Err(format!("课时标签重复: {}", slot.label));
            }
        }
        if !slots.iter().any(TimeSlot::is_teaching) {
            return Err("课时网格至少需要一个教学课时".to_string());
        }

        Ok(Self { days, slots })
    }

    /// 标准网格：周一至周五，9 个课时（含课间、午休）
    pub fn standard() -> Self {
        Self {
            days: SchoolDay::WEEK.to_vec(),
            slots: vec![
                TimeSlot::teaching("8:30-9:30"),
                TimeSlot::teaching("9:30-10:30"),
                TimeSlot::non_teaching("10:30-10:45", SlotKind::Break),
                TimeSlot::teaching("10:45-11:45"),
                TimeSlot::teaching("11:45-12:45"),
                TimeSlot::non_teaching("12:45-1:30", SlotKind::Lunch),
                TimeSlot::teaching("1:30-2:30"),
                TimeSlot::teaching("2:30-3:30"),
                TimeSlot::teaching("3:30-4:30"),
            ],
        }
    }

    pub fn days(&self) -> &[SchoolDay] {
        &self.days
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// 按网格顺序返回教学课时
    pub fn teaching_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|s| s.is_teaching())
    }

    pub fn teaching_slot_count(&self) -> usize {
        self.teaching_slots().count()
    }

    /// 班主任课时（首个教学课时）
    pub fn homeroom_slot(&self) -> Option<&TimeSlot> {
        self.teaching_slots().next()
    }

    pub fn is_homeroom(&self, label: &str) -> bool {
        self.homeroom_slot().map(|s| s.label == label).unwrap_or(false)
    }

    pub fn is_teaching(&self, label: &str) -> bool {
        self.slots.iter().any(|s| s.label == label && s.is_teaching())
    }

    /// 课时在网格中的位置（用于排序）
    pub fn slot_position(&self, label: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.label == label)
    }

    pub fn day_position(&self, day: SchoolDay) -> Option<usize> {
        self.days.iter().position(|d| *d == day)
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::standard()
    }
}
