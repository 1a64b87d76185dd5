// ==========================================
// 周课表排课系统 - 课表与通知领域模型
// ==========================================
// 红线: TimetableEntry 只由排课引擎创建；草稿 → 已发布 只能经发布动作
// ==========================================

use crate::domain::types::{EntryKind, NotificationKind, SchoolDay};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TimetableEntry - 课表条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub entry_id: String,
    pub run_id: String, // 生成批次
    pub semester: i32,
    pub section: String,
    pub day: SchoolDay,
    pub slot: String,
    pub seq_no: i32, // 批次内输出顺序（天优先、课时其次、班主任课在前）
    pub subject: String,
    pub teacher_id: i64,
    pub kind: EntryKind,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub published_at: Option<NaiveDateTime>,
}

impl TimetableEntry {
    /// 排课结果的业务键（不含 ID/时间戳，用于比较两次生成是否一致）
    pub fn assignment_key(&self) -> (SchoolDay, &str, &str, i64, EntryKind) {
        (self.day, self.slot.as_str(), self.subject.as_str(), self.teacher_id, self.kind)
    }

    pub fn is_homeroom(&self) -> bool {
        self.kind == EntryKind::Homeroom
    }
}

// ==========================================
// ScheduleNotification - 代课/停课事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleNotification {
    pub notification_id: String,
    pub run_id: String,
    pub kind: NotificationKind,
    pub semester: i32,
    pub section: String,
    pub day: SchoolDay,
    pub slot: String,
    pub subject: String,
    pub substitute_teacher_id: Option<i64>,
    pub substitute_teacher_name: Option<String>,
    pub message: String,
    pub recipients: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl ScheduleNotification {
    /// 事件业务键（不含 ID/时间戳/正文）
    pub fn event_key(&self) -> (NotificationKind, SchoolDay, &str, &str, Option<i64>) {
        (
            self.kind,
            self.day,
            self.slot.as_str(),
            self.subject.as_str(),
            self.substitute_teacher_id,
        )
    }
}

// ==========================================
// TimetableRow - 课表展示行
// ==========================================
// 供外部渲染（报表/PDF）使用，引擎不关心渲染格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableRow {
    pub day: SchoolDay,
    pub slot: String,
    pub subject: String,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub kind: EntryKind,
    pub published: bool,
}
