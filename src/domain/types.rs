// ==========================================
// 周课表排课系统 - 领域类型定义
// ==========================================
// 序列化格式: 与数据库文本列保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 枚举文本解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无法解析{kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ==========================================
// 教学日 (School Day)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    /// 一周五个教学日（网格顺序）
    pub const WEEK: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Monday",
            SchoolDay::Tuesday => "Tuesday",
            SchoolDay::Wednesday => "Wednesday",
            SchoolDay::Thursday => "Thursday",
            SchoolDay::Friday => "Friday",
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchoolDay {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Monday" => Ok(SchoolDay::Monday),
            "Tuesday" => Ok(SchoolDay::Tuesday),
            "Wednesday" => Ok(SchoolDay::Wednesday),
            "Thursday" => Ok(SchoolDay::Thursday),
            "Friday" => Ok(SchoolDay::Friday),
            other => Err(ParseEnumError::new("教学日", other)),
        }
    }
}

// ==========================================
// 课时类型 (Slot Kind)
// ==========================================
// 仅 TEACHING 参与排课；BREAK / LUNCH 永远跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotKind {
    Teaching,
    Break,
    Lunch,
}

impl SlotKind {
    pub fn is_teaching(&self) -> bool {
        matches!(self, SlotKind::Teaching)
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Teaching => write!(f, "TEACHING"),
            SlotKind::Break => write!(f, "BREAK"),
            SlotKind::Lunch => write!(f, "LUNCH"),
        }
    }
}

// ==========================================
// 课表条目来源 (Entry Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Homeroom,   // 班主任课（每日首个教学课时）
    Matched,    // 科目匹配教师
    Substitute, // 代课（必须伴随代课通知）
}

impl EntryKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntryKind::Homeroom => "HOMEROOM",
            EntryKind::Matched => "MATCHED",
            EntryKind::Substitute => "SUBSTITUTE",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for EntryKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HOMEROOM" => Ok(EntryKind::Homeroom),
            "MATCHED" => Ok(EntryKind::Matched),
            "SUBSTITUTE" => Ok(EntryKind::Substitute),
            other => Err(ParseEnumError::new("条目类型", other)),
        }
    }
}

// ==========================================
// 通知类型 (Notification Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Substitution, // 代课
    Cancellation, // 停课
}

impl NotificationKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            NotificationKind::Substitution => "SUBSTITUTION",
            NotificationKind::Cancellation => "CANCELLATION",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SUBSTITUTION" => Ok(NotificationKind::Substitution),
            "CANCELLATION" => Ok(NotificationKind::Cancellation),
            other => Err(ParseEnumError::new("通知类型", other)),
        }
    }
}

// ==========================================
// 课时占用策略 (Slot Occupancy Policy)
// ==========================================
// 同一班级同一课时能否容纳多个科目，由配置显式选择：
// - SINGLE_SUBJECT: 一个课时只落一个科目（默认）
// - PARALLEL_SUBJECTS: 每个科目独立尝试同一课时（同一课时可落多个科目）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotOccupancyPolicy {
    SingleSubject,
    ParallelSubjects,
}

impl Default for SlotOccupancyPolicy {
    fn default() -> Self {
        SlotOccupancyPolicy::SingleSubject
    }
}

impl fmt::Display for SlotOccupancyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotOccupancyPolicy::SingleSubject => write!(f, "SINGLE_SUBJECT"),
            SlotOccupancyPolicy::ParallelSubjects => write!(f, "PARALLEL_SUBJECTS"),
        }
    }
}

impl FromStr for SlotOccupancyPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SINGLE_SUBJECT" => Ok(SlotOccupancyPolicy::SingleSubject),
            "PARALLEL_SUBJECTS" => Ok(SlotOccupancyPolicy::ParallelSubjects),
            _ => Err(ParseEnumError::new("课时占用策略", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_day_parse_and_display() {
        for day in SchoolDay::WEEK {
            assert_eq!(day.as_str().parse::<SchoolDay>().unwrap(), day);
        }
        assert!("Saturday".parse::<SchoolDay>().is_err());
        assert!("monday".parse::<SchoolDay>().is_err());
    }

    #[test]
    fn test_entry_kind_db_roundtrip() {
        assert_eq!("SUBSTITUTE".parse::<EntryKind>().unwrap(), EntryKind::Substitute);
        assert_eq!(EntryKind::Homeroom.to_db_str(), "HOMEROOM");
        let err = "OTHER".parse::<EntryKind>().unwrap_err();
        assert_eq!(err.value, "OTHER");
    }

    #[test]
    fn test_occupancy_policy_is_case_insensitive() {
        assert_eq!(
            "parallel_subjects".parse::<SlotOccupancyPolicy>().unwrap(),
            SlotOccupancyPolicy::ParallelSubjects
        );
        assert_eq!(SlotOccupancyPolicy::default(), SlotOccupancyPolicy::SingleSubject);
        assert!("ONE_PER_SLOT".parse::<SlotOccupancyPolicy>().is_err());
    }
}
