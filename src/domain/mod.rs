// ==========================================
// 周课表排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与课时网格
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod availability;
pub mod slot_grid;
pub mod student;
pub mod teacher;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use availability::AvailabilityRecord;
pub use slot_grid::{SlotGrid, TimeSlot};
pub use student::{recipient_emails, Student};
pub use teacher::{tokenize_capabilities, NewTeacher, Teacher, DEFAULT_CAPABILITY_DELIMITER};
pub use timetable::{ScheduleNotification, TimetableEntry, TimetableRow};
pub use types::{
    EntryKind, NotificationKind, ParseEnumError, SchoolDay, SlotKind, SlotOccupancyPolicy,
};
