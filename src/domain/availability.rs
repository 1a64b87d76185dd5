// ==========================================
// 周课表排课系统 - 教师空闲记录
// ==========================================
// 缺省策略: 无记录即视为空闲
// ==========================================

use crate::domain::types::SchoolDay;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub teacher_id: i64,
    pub day: SchoolDay,
    pub slot: String,
    pub subject: Option<String>, // None = 不区分科目
    pub available: bool,
}

impl AvailabilityRecord {
    pub fn new(teacher_id: i64, day: SchoolDay, slot: &str, available: bool) -> Self {
        Self {
            teacher_id,
            day,
            slot: slot.to_string(),
            subject: None,
            available,
        }
    }
}
